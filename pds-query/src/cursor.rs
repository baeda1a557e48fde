use crate::errors::QueryError;
use crate::frame::ProductFrame;
use crate::query::QuerySpec;
use crate::record::ProductRecord;
use crate::transport::{ContinuationToken, Page, RegistryTransport};
use log::debug;
use std::collections::VecDeque;
use std::sync::Arc;

/// Observable state of a cursor.
///
/// Page requests are synchronous, so the fetching state only exists for the
/// duration of a `next()` call and is never observed from outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorPhase {
    Fresh,
    Delivering,
    Exhausted,
}

#[derive(Debug)]
enum CursorState {
    Fresh,
    Delivering {
        buffer: VecDeque<ProductRecord>,
        next_token: Option<ContinuationToken>,
    },
    Exhausted,
}

/// Lazy, single-consumer iteration over every product matching a query.
///
/// Pages are requested one at a time, only when the buffered page runs out.
/// A failed request is yielded once as an error and ends the iteration;
/// records already yielded stay valid.
pub struct ResultCursor {
    transport: Arc<dyn RegistryTransport>,
    spec: QuerySpec,
    cap: Option<usize>,
    compiled: Option<Option<String>>,
    state: CursorState,
    delivered: usize,
    requests: usize,
}

impl ResultCursor {
    pub fn new(transport: Arc<dyn RegistryTransport>, spec: QuerySpec) -> Self {
        let cap = spec.limit;
        Self {
            transport,
            spec,
            cap,
            compiled: None,
            state: CursorState::Fresh,
            delivered: 0,
            requests: 0,
        }
    }

    /// Lower the cap to `max_rows` if given; never raises the query's own limit
    pub fn with_max_rows(mut self, max_rows: Option<usize>) -> Self {
        self.cap = self.spec.capped(max_rows);
        self
    }

    pub fn spec(&self) -> &QuerySpec {
        &self.spec
    }

    pub fn phase(&self) -> CursorPhase {
        match self.state {
            CursorState::Fresh => CursorPhase::Fresh,
            CursorState::Delivering { .. } => CursorPhase::Delivering,
            CursorState::Exhausted => CursorPhase::Exhausted,
        }
    }

    /// Records yielded since creation or the last reset
    pub fn delivered(&self) -> usize {
        self.delivered
    }

    /// Page requests issued over the cursor's whole life
    pub fn requests(&self) -> usize {
        self.requests
    }

    /// Back to `Fresh`: the buffered page and the delivered count are
    /// discarded, the query is kept.
    pub fn reset(&mut self) {
        self.state = CursorState::Fresh;
        self.delivered = 0;
    }

    /// Drain the cursor into a frame; `Ok(None)` when nothing matched
    pub fn into_frame(self) -> Result<Option<ProductFrame>, QueryError> {
        let records = self.collect::<Result<Vec<_>, _>>()?;
        Ok(ProductFrame::from_products(&records))
    }

    fn cap_reached(&self) -> bool {
        self.cap.is_some_and(|cap| self.delivered >= cap)
    }

    fn fetch(&mut self, token: Option<&ContinuationToken>) -> Result<Page, QueryError> {
        let spec = &self.spec;
        let query = self.compiled.get_or_insert_with(|| spec.compile());
        debug!(
            "Requesting page {} of q={:?} after={:?}",
            self.requests + 1,
            query,
            token.map(ContinuationToken::as_str)
        );
        self.requests += 1;
        let page = self
            .transport
            .execute_page(query.as_deref(), token, &self.spec.fields)?;
        debug!(
            "Received {} record(s), more pages: {}",
            page.records.len(),
            page.next_token.is_some()
        );
        Ok(page)
    }
}

impl Iterator for ResultCursor {
    type Item = Result<ProductRecord, QueryError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.cap_reached() {
                self.state = CursorState::Exhausted;
                return None;
            }
            let token = match &mut self.state {
                CursorState::Exhausted => return None,
                CursorState::Fresh => None,
                CursorState::Delivering { buffer, next_token } => {
                    if let Some(record) = buffer.pop_front() {
                        self.delivered += 1;
                        return Some(Ok(record));
                    }
                    match next_token.take() {
                        Some(token) => Some(token),
                        None => {
                            self.state = CursorState::Exhausted;
                            return None;
                        }
                    }
                }
            };
            match self.fetch(token.as_ref()) {
                Ok(page) => {
                    self.state = CursorState::Delivering {
                        buffer: page.records.into(),
                        next_token: page.next_token,
                    };
                }
                Err(e) => {
                    self.state = CursorState::Exhausted;
                    return Some(Err(e));
                }
            }
        }
    }
}

impl std::fmt::Debug for ResultCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultCursor")
            .field("spec", &self.spec)
            .field("cap", &self.cap)
            .field("phase", &self.phase())
            .field("delivered", &self.delivered)
            .field("requests", &self.requests)
            .finish()
    }
}
