//! Read queries over the index.
//!
//! All list queries return complete decisions ordered newest first
//! (`created_at DESC, id DESC`), except full-text search, which orders by
//! FTS5 rank. Orphan rows never appear in list results.

use std::fmt::Write as _;

use keel_core::decision::{Decision, DecisionRecord};
use keel_core::enums::{DecisionStatus, DecisionType};
use keel_core::ids::normalize_id;
use keel_core::responses::DecisionContext;

use crate::error::DatabaseError;
use crate::helpers::{escape_like, glob_to_like, is_search_syntax_error, value_to_json};
use crate::index::row::{DecisionRow, ROW_COLUMNS};
use crate::service::KeelService;

const NEWEST_FIRST: &str = "ORDER BY d.created_at DESC, d.id DESC";

/// Statements `read_only_sql` refuses to run, matched as whole words.
const WRITE_KEYWORDS: [&str; 12] = [
    "INSERT", "UPDATE", "DELETE", "DROP", "ALTER", "CREATE", "REPLACE", "ATTACH", "DETACH",
    "PRAGMA", "VACUUM", "REINDEX",
];

/// Optional filters shared by `all` and `full_text`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryFilter {
    pub kind: Option<DecisionType>,
    pub status: Option<DecisionStatus>,
    pub limit: Option<u32>,
}

impl QueryFilter {
    /// Append `AND ...` clauses for the set filters, pushing their values
    /// onto `params` and numbering placeholders after the existing ones.
    fn where_clause(&self, params: &mut Vec<libsql::Value>) -> String {
        let mut sql = String::new();
        if let Some(kind) = self.kind {
            params.push(kind.as_str().into());
            let _ = write!(sql, " AND d.type = ?{}", params.len());
        }
        if let Some(status) = self.status {
            params.push(status.as_str().into());
            let _ = write!(sql, " AND d.status = ?{}", params.len());
        }
        sql
    }

    /// A limit of zero means no limit.
    fn limit_clause(&self) -> String {
        self.limit
            .filter(|n| *n > 0)
            .map(|n| format!(" LIMIT {n}"))
            .unwrap_or_default()
    }
}

impl KeelService {
    /// Look up one decision by ID, in any status.
    ///
    /// Accepts any form `normalize_id` accepts. An orphan row reads as
    /// `None`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Core(InvalidIdentifier)` for malformed input,
    /// or `DatabaseError` if the query fails.
    pub async fn by_id(&self, id: &str) -> Result<Option<Decision>, DatabaseError> {
        let id = normalize_id(id)?;
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {ROW_COLUMNS} FROM decisions d WHERE d.id = ?1"),
                [id.as_str()],
            )
            .await?;
        match rows.next().await? {
            Some(row) => DecisionRow::from_row(&row)?.into_decision(),
            None => Ok(None),
        }
    }

    /// Active decisions linked to a file.
    ///
    /// An argument containing `*` is a glob: each `*` matches any run of
    /// characters (ASCII case-insensitive). Otherwise the path must match
    /// exactly.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn by_file(&self, path_or_glob: &str) -> Result<Vec<Decision>, DatabaseError> {
        if path_or_glob.contains('*') {
            self.active_by_association(
                r"SELECT decision_id FROM decision_files WHERE path LIKE ?1 ESCAPE '\'",
                &glob_to_like(path_or_glob),
            )
            .await
        } else {
            self.active_by_association(
                "SELECT decision_id FROM decision_files WHERE path = ?1",
                path_or_glob,
            )
            .await
        }
    }

    /// Active decisions linked to a code symbol (exact match).
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn by_symbol(&self, name: &str) -> Result<Vec<Decision>, DatabaseError> {
        self.active_by_association(
            "SELECT decision_id FROM decision_symbols WHERE symbol = ?1",
            name,
        )
        .await
    }

    /// Active decisions linked to a work item (exact match).
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn by_bead(&self, bead_id: &str) -> Result<Vec<Decision>, DatabaseError> {
        self.active_by_association(
            "SELECT decision_id FROM decision_beads WHERE bead_id = ?1",
            bead_id,
        )
        .await
    }

    /// Every decision matching `filter`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn all(&self, filter: QueryFilter) -> Result<Vec<Decision>, DatabaseError> {
        let mut params = Vec::new();
        let filters = filter.where_clause(&mut params);
        let sql = format!(
            "SELECT {ROW_COLUMNS} FROM decisions d WHERE d.complete = 1{filters} {NEWEST_FIRST}{}",
            filter.limit_clause()
        );
        self.collect_decisions(&sql, params).await
    }

    /// Full-text search over problem, choice, and rationale.
    ///
    /// Results are ranked by FTS5 relevance. If the engine rejects `query`
    /// as malformed search syntax, the same filters run as a literal
    /// substring match instead (see [`KeelService::substring_search`]). A
    /// blank query is the same as [`KeelService::all`].
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` for failures other than search syntax.
    pub async fn full_text(
        &self,
        query: &str,
        filter: QueryFilter,
    ) -> Result<Vec<Decision>, DatabaseError> {
        let query = query.trim();
        if query.is_empty() {
            return self.all(filter).await;
        }
        match self.fts_search(query, filter).await {
            Err(DatabaseError::LibSql(e)) if is_search_syntax_error(&e) => {
                tracing::debug!(query, "FTS5 rejected query, falling back to substring match: {e}");
                self.substring_search(query, filter).await
            }
            other => other,
        }
    }

    /// Literal, ASCII case-insensitive substring match over problem, choice,
    /// and rationale, with the same filters as `full_text`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn substring_search(
        &self,
        query: &str,
        filter: QueryFilter,
    ) -> Result<Vec<Decision>, DatabaseError> {
        let mut params: Vec<libsql::Value> = vec![format!("%{}%", escape_like(query)).into()];
        let filters = filter.where_clause(&mut params);
        let sql = format!(
            r"SELECT {ROW_COLUMNS} FROM decisions d
             WHERE d.complete = 1
               AND (d.problem LIKE ?1 ESCAPE '\'
                    OR d.choice LIKE ?1 ESCAPE '\'
                    OR d.rationale LIKE ?1 ESCAPE '\'){filters}
             {NEWEST_FIRST}{}",
            filter.limit_clause()
        );
        self.collect_decisions(&sql, params).await
    }

    /// Active decisions of type `constraint`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn active_constraints(&self) -> Result<Vec<Decision>, DatabaseError> {
        self.all(QueryFilter {
            kind: Some(DecisionType::Constraint),
            status: Some(DecisionStatus::Active),
            limit: None,
        })
        .await
    }

    /// Decisions relevant to a file or symbol, plus every active constraint.
    ///
    /// The input is tried as a file path (or glob) first and as a symbol
    /// name if no file matches.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if a query fails.
    pub async fn context_for(&self, path_or_symbol: &str) -> Result<DecisionContext, DatabaseError> {
        let mut decisions = self.by_file(path_or_symbol).await?;
        if decisions.is_empty() {
            decisions = self.by_symbol(path_or_symbol).await?;
        }
        Ok(DecisionContext {
            decisions,
            constraints: self.active_constraints().await?,
        })
    }

    /// Records in the index that never received a creation entry.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or a row cannot be decoded.
    pub async fn orphans(&self) -> Result<Vec<DecisionRecord>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {ROW_COLUMNS} FROM decisions d WHERE d.complete = 0 ORDER BY d.id"),
                (),
            )
            .await?;
        let mut records = Vec::new();
        while let Some(row) = rows.next().await? {
            records.push(DecisionRow::from_row(&row)?.into_record()?);
        }
        Ok(records)
    }

    /// Number of complete decisions in the index.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn count(&self) -> Result<u32, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query("SELECT COUNT(*) FROM decisions WHERE complete = 1", ())
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        let n = row.get::<i64>(0)?;
        u32::try_from(n).map_err(|e| DatabaseError::Other(e.into()))
    }

    /// Run an ad-hoc read-only query against the index.
    ///
    /// Only a single `SELECT` or `WITH` statement is accepted. Each row comes
    /// back as a JSON object keyed by column name.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Query` if the statement is not read-only, or
    /// `DatabaseError` if it fails to run.
    pub async fn read_only_sql(
        &self,
        sql: &str,
    ) -> Result<Vec<serde_json::Map<String, serde_json::Value>>, DatabaseError> {
        let statement = sql.trim().trim_end_matches(';').trim_end();
        check_read_only(statement)?;

        let mut rows = self.db().conn().query(statement, ()).await?;
        let columns: Vec<String> = (0..rows.column_count())
            .map(|i| rows.column_name(i).unwrap_or("?").to_string())
            .collect();

        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            let mut object = serde_json::Map::new();
            for (idx, name) in (0..).zip(&columns) {
                object.insert(name.clone(), value_to_json(row.get_value(idx)?));
            }
            out.push(object);
        }
        Ok(out)
    }

    async fn fts_search(
        &self,
        query: &str,
        filter: QueryFilter,
    ) -> Result<Vec<Decision>, DatabaseError> {
        let mut params: Vec<libsql::Value> = vec![query.into()];
        let filters = filter.where_clause(&mut params);
        let sql = format!(
            "SELECT {ROW_COLUMNS} FROM decisions_fts
             JOIN decisions d ON d.rowid = decisions_fts.rowid
             WHERE decisions_fts MATCH ?1 AND d.complete = 1{filters}
             ORDER BY rank{}",
            filter.limit_clause()
        );
        self.collect_decisions(&sql, params).await
    }

    async fn active_by_association(
        &self,
        id_subquery: &str,
        value: &str,
    ) -> Result<Vec<Decision>, DatabaseError> {
        let sql = format!(
            "SELECT {ROW_COLUMNS} FROM decisions d
             WHERE d.id IN ({id_subquery}) AND d.complete = 1 AND d.status = 'active'
             {NEWEST_FIRST}"
        );
        self.collect_decisions(&sql, vec![value.into()]).await
    }

    async fn collect_decisions(
        &self,
        sql: &str,
        params: Vec<libsql::Value>,
    ) -> Result<Vec<Decision>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(sql, libsql::params_from_iter(params))
            .await?;
        let mut decisions = Vec::new();
        while let Some(row) = rows.next().await? {
            if let Some(decision) = DecisionRow::from_row(&row)?.into_decision()? {
                decisions.push(decision);
            }
        }
        Ok(decisions)
    }
}

fn check_read_only(statement: &str) -> Result<(), DatabaseError> {
    let first = statement
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_ascii_uppercase();
    let writes = statement
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .any(|word| WRITE_KEYWORDS.iter().any(|kw| word.eq_ignore_ascii_case(kw)));

    if !matches!(first.as_str(), "SELECT" | "WITH") || writes || statement.contains(';') {
        return Err(DatabaseError::Query(
            "only a single read-only SELECT statement is allowed".into(),
        ));
    }
    Ok(())
}
