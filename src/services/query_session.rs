//! Client-side query/display cycle
//!
//! `Idle -> Submitting -> Displaying | Failed -> Submitting -> ...`
//!
//! Each submission gets a `RequestTicket`. How a response for an older ticket
//! is treated depends on the session's `ResponsePolicy`.

use crate::{
    middleware::error_handling::{ChartError, EMPTY_RESULT_MESSAGE},
    models::{
        chart::{ChartConfig, ChartDataset, ChartKind, TableModel},
        query::ResultSet,
    },
    services::{color::ChartPalette, query_client::ClientError, result_shaper::shape},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestTicket(u64);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResponsePolicy {
    /// Whatever response arrives last is displayed, even for an older submission
    LastArrivalWins,
    /// Responses for anything but the most recent submission are discarded
    #[default]
    LatestSubmissionWins,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Submitting,
    Displaying,
    Failed,
}

/// What `complete` did with a response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Displayed,
    Failed,
    Discarded,
}

#[derive(Debug, Clone)]
pub struct QuerySession {
    policy: ResponsePolicy,
    palette: ChartPalette,
    chart_kind: ChartKind,
    state: SessionState,
    next_ticket: u64,
    latest: Option<RequestTicket>,
    dataset: Option<ChartDataset>,
    table: Option<TableModel>,
    error: Option<String>,
    chart_error: Option<ChartError>,
    sql_query: Option<String>,
}

impl QuerySession {
    pub fn new(policy: ResponsePolicy, palette: ChartPalette) -> Self {
        Self {
            policy,
            palette,
            chart_kind: ChartKind::default(),
            state: SessionState::Idle,
            next_ticket: 0,
            latest: None,
            dataset: None,
            table: None,
            error: None,
            chart_error: None,
            sql_query: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Why the chart is missing while the table is shown, if it is
    pub fn chart_error(&self) -> Option<&ChartError> {
        self.chart_error.as_ref()
    }

    pub fn sql_query(&self) -> Option<&str> {
        self.sql_query.as_deref()
    }

    pub fn dataset(&self) -> Option<&ChartDataset> {
        self.dataset.as_ref()
    }

    pub fn table(&self) -> Option<&TableModel> {
        self.table.as_ref().filter(|t| t.is_renderable())
    }

    pub fn chart_kind(&self) -> ChartKind {
        self.chart_kind
    }

    pub fn set_chart_kind(&mut self, kind: ChartKind) {
        self.chart_kind = kind;
    }

    /// Chart widget configuration for the current dataset and chart kind
    pub fn chart(&self) -> Option<ChartConfig> {
        self.dataset
            .as_ref()
            .map(|dataset| ChartConfig::render(dataset, self.chart_kind))
    }

    pub fn begin_submit(&mut self) -> RequestTicket {
        self.next_ticket += 1;
        let ticket = RequestTicket(self.next_ticket);
        self.latest = Some(ticket);
        self.state = SessionState::Submitting;
        ticket
    }

    /// Apply the response for `ticket`.
    pub fn complete(
        &mut self,
        ticket: RequestTicket,
        response: Result<ResultSet, ClientError>,
    ) -> Applied {
        if self.policy == ResponsePolicy::LatestSubmissionWins && self.latest != Some(ticket) {
            tracing::debug!(?ticket, latest = ?self.latest, "Discarding superseded response");
            return Applied::Discarded;
        }

        match response {
            Ok(result_set) if result_set.is_empty() => {
                self.fail(EMPTY_RESULT_MESSAGE.to_string());
                self.sql_query = Some(result_set.sql_query);
                Applied::Failed
            }
            Ok(result_set) => {
                self.display(result_set);
                Applied::Displayed
            }
            Err(err) => {
                self.fail(err.to_string());
                Applied::Failed
            }
        }
    }

    fn display(&mut self, result_set: ResultSet) {
        let table = TableModel::from_records(result_set.records);

        match shape(&table.rows, &self.palette) {
            Ok(shaped) => {
                self.dataset = Some(shaped.dataset);
                self.chart_error = None;
            }
            Err(err) => {
                tracing::warn!("Result could not be charted: {}", err);
                self.dataset = None;
                self.chart_error = Some(err);
            }
        }

        self.table = Some(table);
        self.sql_query = Some(result_set.sql_query);
        self.error = None;
        self.state = SessionState::Displaying;
    }

    fn fail(&mut self, message: String) {
        self.dataset = None;
        self.table = None;
        self.chart_error = None;
        self.sql_query = None;
        self.error = Some(message);
        self.state = SessionState::Failed;
    }
}

impl Default for QuerySession {
    fn default() -> Self {
        Self::new(ResponsePolicy::default(), ChartPalette::default())
    }
}
