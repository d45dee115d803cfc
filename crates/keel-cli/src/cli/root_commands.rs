use clap::{ArgGroup, Args, Subcommand};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Record a new decision.
    Decide(DecideArgs),
    /// Replace an active decision with a new one.
    Supersede(SupersedeArgs),
    /// Show the full details of one decision.
    Why(WhyArgs),
    /// Search decisions by text, file, symbol, or bead.
    Search(SearchArgs),
    /// Decisions affecting a file or symbol, plus active constraints.
    Context(ContextArgs),
    /// Rebuild the index from the journal.
    Rebuild,
    /// Journal and index locations and freshness.
    Status,
    /// Run a read-only SQL query against the index.
    Sql(SqlArgs),
    /// Print the JSON Schema of a Keel document type.
    Schema(SchemaArgs),
}

/// Decision content shared by `decide` and `supersede`.
#[derive(Clone, Debug, Default, Args)]
pub struct DecisionFields {
    /// Decision type: product, process, constraint, learning
    #[arg(long = "type", value_name = "TYPE")]
    pub kind: Option<String>,

    /// The problem being decided
    #[arg(long)]
    pub problem: Option<String>,

    /// What was chosen
    #[arg(long)]
    pub choice: Option<String>,

    /// Why it was chosen
    #[arg(long)]
    pub rationale: Option<String>,

    /// A tradeoff accepted (repeatable)
    #[arg(long = "tradeoff", value_name = "TEXT")]
    pub tradeoffs: Vec<String>,

    /// A file the decision applies to (repeatable or comma-separated)
    #[arg(long = "file", value_name = "PATH", value_delimiter = ',')]
    pub files: Vec<String>,

    /// A code symbol the decision applies to (repeatable or comma-separated)
    #[arg(long = "symbol", value_name = "NAME", value_delimiter = ',')]
    pub symbols: Vec<String>,

    /// An issue-tracker bead ID (repeatable or comma-separated)
    #[arg(long = "bead", value_name = "ID", value_delimiter = ',')]
    pub beads: Vec<String>,

    /// Record the decision as made by an agent rather than a human
    #[arg(long)]
    pub agent: bool,

    /// Who made the decision (defaults to the git identity)
    #[arg(long)]
    pub identifier: Option<String>,

    /// Expected outcome, for decisions that are experiments
    #[arg(long)]
    pub hypothesis: Option<String>,

    /// How to tell whether the decision worked
    #[arg(long)]
    pub success_criteria: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct DecideArgs {
    #[command(flatten)]
    pub fields: DecisionFields,

    /// Read the whole decision as a JSON object instead of flags ("-" for stdin)
    #[arg(long, value_name = "JSON", conflicts_with_all = ["kind", "problem", "choice"])]
    pub json: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct SupersedeArgs {
    /// Decision to replace (DEC-xxxx or just xxxx)
    pub id: String,

    // Type, files, symbols, and beads default to the superseded decision's.
    #[command(flatten)]
    pub fields: DecisionFields,
}

#[derive(Clone, Debug, Args)]
pub struct WhyArgs {
    /// Decision ID (DEC-xxxx or just xxxx)
    pub id: String,
}

#[derive(Clone, Debug, Args)]
#[command(group(
    ArgGroup::new("lookup")
        .args(["query", "file", "symbol", "bead"])
        .multiple(false)
))]
pub struct SearchArgs {
    /// Full-text query over problem, choice, and rationale
    pub query: Option<String>,

    /// Decisions attached to a file path or glob (`src/*.rs`)
    #[arg(long, value_name = "PATH")]
    pub file: Option<String>,

    /// Decisions attached to a code symbol
    #[arg(long, value_name = "NAME")]
    pub symbol: Option<String>,

    /// Decisions attached to an issue-tracker bead
    #[arg(long, value_name = "ID")]
    pub bead: Option<String>,

    /// Only decisions of this type
    #[arg(long = "type", value_name = "TYPE")]
    pub kind: Option<String>,

    /// Only decisions with this status: active, superseded
    #[arg(long)]
    pub status: Option<String>,

    /// Match the query as a plain substring instead of FTS5 syntax
    #[arg(long, requires = "query")]
    pub literal: bool,
}

#[derive(Clone, Debug, Args)]
pub struct ContextArgs {
    /// File path, glob, or symbol name
    pub target: String,
}

#[derive(Clone, Debug, Args)]
pub struct SqlArgs {
    /// A single SELECT or WITH statement
    pub query: String,
}

#[derive(Clone, Debug, Args)]
pub struct SchemaArgs {
    /// Document type: record, decision, input, context, rebuild, status
    #[arg(default_value = "record")]
    pub type_name: String,
}
