//! Conversational retrieval façade.
//!
//! `RecruiterBot` treats each incoming message as a job description, runs
//! the retrieval pipeline over it, and renders the matches as a plain-text
//! reply.

use crate::context::AppContext;
use crate::error::Result;
use crate::metadata::QueryFilter;
use crate::retrieval::RetrievalParams;
use std::fmt::Write as _;
use tracing::debug;

/// Reply to a blank message; no retrieval is attempted.
pub const EMPTY_MESSAGE_REPLY: &str = "Please provide a job description or more details.";

/// Reply when the filtered retrieval comes back empty.
pub const NO_MATCHES_REPLY: &str = "No applicants matched the current criteria.";

/// First line of a reply that carries matches.
pub const MATCHES_HEADER: &str = "Top matching applicants:";

/// Chat front end over the retrieval pipeline.
///
/// Remembers the last job description and any pinned filters; it keeps no
/// other conversation history.
pub struct RecruiterBot<'a> {
    context: &'a AppContext,
    params: RetrievalParams,
    filters: Option<QueryFilter>,
    last_query: Option<String>,
}

impl<'a> RecruiterBot<'a> {
    /// Create a bot with the conversational retrieval defaults (top 5
    /// matches from a pool of 200).
    pub fn new(context: &'a AppContext) -> Self {
        Self {
            context,
            params: RetrievalParams {
                top_n: crate::constants::retrieval::BOT_TOP_N,
                search_k: crate::constants::retrieval::BOT_SEARCH_K,
            },
            filters: None,
            last_query: None,
        }
    }

    /// Override the retrieval knobs.
    pub fn with_params(mut self, params: RetrievalParams) -> Self {
        self.params = params;
        self
    }

    /// Pin explicit filters, replacing message-derived filtering entirely
    /// until [`clear_filters`] is called.
    ///
    /// [`clear_filters`]: RecruiterBot::clear_filters
    pub fn set_filters(&mut self, filters: QueryFilter) {
        self.filters = Some(filters);
    }

    /// Go back to deriving filters from each message.
    pub fn clear_filters(&mut self) {
        self.filters = None;
    }

    /// The last non-blank job description this bot searched with.
    pub fn last_query(&self) -> Option<&str> {
        self.last_query.as_deref()
    }

    /// Handle one message and produce a reply.
    ///
    /// A blank message short-circuits without touching the index. Matches
    /// are rendered one per line as
    /// `{rank}. {name} — Score: {score} (row_idx={idx})`, falling back to
    /// `idx:{position}` when the candidate row has no name.
    pub fn chat(&mut self, message: &str) -> Result<String> {
        if message.trim().is_empty() {
            return Ok(EMPTY_MESSAGE_REPLY.to_string());
        }
        self.last_query = Some(message.to_string());

        let matches =
            self.context
                .find_top_applicants(message, self.filters.as_ref(), self.params)?;
        debug!(matches = matches.len(), "handled chat message");

        if matches.is_empty() {
            return Ok(NO_MATCHES_REPLY.to_string());
        }

        let mut reply = MATCHES_HEADER.to_string();
        for (rank, m) in matches.iter().enumerate() {
            let name = m
                .display_name
                .clone()
                .unwrap_or_else(|| format!("idx:{}", m.applicant_idx));
            let _ = write!(
                reply,
                "\n{}. {} — Score: {:.4} (row_idx={})",
                rank + 1,
                name,
                m.score,
                m.applicant_idx
            );
        }
        Ok(reply)
    }
}
