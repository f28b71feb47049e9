use std::sync::Arc;

use anyhow::Result;
use tokio::sync::{mpsc, oneshot, Mutex};

use super::message::{Request, Response};
use crate::adapter::PageAdapter;
use crate::browser::TabPool;
use crate::config::AdapterConfig;
use crate::error::RelayError;
use crate::sheets::{parse_range, CellRef};

/// Validates panel requests and forwards them to the active tab's adapter.
/// Holds nothing between calls beyond the shared tab pool.
#[derive(Clone)]
pub struct Coordinator {
    tabs: Arc<Mutex<TabPool>>,
    config: Arc<AdapterConfig>,
}

impl Coordinator {
    pub fn new(tabs: Arc<Mutex<TabPool>>, config: Arc<AdapterConfig>) -> Self {
        Self { tabs, config }
    }

    /// Handle a raw JSON message.
    pub async fn handle(&self, message: serde_json::Value) -> Response {
        match Request::from_message(message) {
            Ok(request) => self.dispatch(request).await,
            Err(e) => {
                tracing::warn!("Rejected message: {}", e);
                e.into()
            }
        }
    }

    pub async fn dispatch(&self, request: Request) -> Response {
        let action = request.action();
        if let Err(e) = request.validate(self.config.sheets.max_range_cells) {
            tracing::warn!("{} rejected: {}", action, e);
            return e.into();
        }

        let Some(page) = self.tabs.lock().await.active_page().cloned() else {
            tracing::warn!("{} dropped: no active tab", action);
            return RelayError::NoActiveTab.into();
        };

        tracing::debug!("Forwarding {}", action);
        let range_action = request.is_range_action();
        let adapter = PageAdapter::new(page, self.config.clone());
        match forward(&adapter, request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("{} failed: {:#}", action, e);
                let message = format!("{:#}", e);
                if range_action {
                    Response::Error { error: message }
                } else {
                    RelayError::Adapter(message).into()
                }
            }
        }
    }

    /// Run the coordinator as its own task. Requests are served one at a
    /// time, in arrival order.
    pub fn spawn(self) -> RelayHandle {
        let (tx, mut rx) = mpsc::channel::<Envelope>(16);
        tokio::spawn(async move {
            while let Some((request, reply)) = rx.recv().await {
                let response = self.dispatch(request).await;
                if reply.send(response).is_err() {
                    tracing::debug!("Requester went away before the reply");
                }
            }
            tracing::debug!("Coordinator stopped");
        });
        RelayHandle { tx }
    }
}

async fn forward(adapter: &PageAdapter, request: Request) -> Result<Response> {
    let response = match request {
        Request::GetCurrentCellIndex => Response::CellIndex {
            cell_index: adapter.current_cell_reference().await?,
        },
        Request::SetCurrentCellIndex { cell_index } => {
            adapter.set_current_cell_reference(&cell_index).await?;
            Response::ok()
        }
        Request::GetCurrentCellValue => Response::CellValue {
            cell_value: adapter.current_cell_value().await?,
        },
        Request::GetCellValue {
            cell_index,
            restore_selection,
        } => Response::CellValue {
            cell_value: adapter
                .read_cell_value(Some(&cell_index), restore_selection)
                .await?,
        },
        Request::SetCellValue {
            cell_index,
            cell_value,
            preserve_selection,
        } => {
            let cell = match cell_index {
                Some(cell) => cell,
                None => {
                    let current = adapter.current_cell_reference().await?;
                    if current.trim().is_empty() {
                        return Ok(Response::failed("No cell selected"));
                    }
                    CellRef::A1(current)
                }
            };
            adapter
                .write_cell_value(&cell, &cell_value, preserve_selection)
                .await?;
            Response::ok()
        }
        Request::GetDropdownListByRange { range } => {
            Response::Options(adapter.dropdown_options(&CellRef::A1(range)).await?)
        }
        Request::GetSheetNames => Response::SheetNames {
            sheet_names: adapter.sheet_names().await?,
        },
        Request::SheetSelected { sheet_name } => {
            if adapter.select_sheet_tab(&sheet_name).await? {
                Response::ok()
            } else {
                Response::failed(format!("Tab with name \"{}\" not found", sheet_name))
            }
        }
        Request::ScrapeSections => Response::Sections(adapter.scrape(false).await?),
        Request::ScrapeSectionsWithAnswers => Response::Sections(adapter.scrape(true).await?),
        Request::GrabAnswer(question) => Response::Answer(adapter.grab_answer(&question).await?),
        Request::PushAnswer(question) => {
            adapter.push_answer(&question).await?;
            Response::ok()
        }
        Request::ScrollToQuestion(question) => {
            let outcome = adapter.scroll_to_question(&question).await?;
            Response::Status {
                success: outcome.success,
                error: outcome.error,
            }
        }
        Request::SelectRange { range: Some(range) } => {
            adapter.select_range(&parse_range(&range)?).await?;
            Response::Range { range }
        }
        Request::SelectRange { range: None } | Request::GetSelectedRange => {
            match adapter.selected_range().await? {
                Some(range) => Response::Range { range },
                None => Response::Error {
                    error: "No range selected".into(),
                },
            }
        }
        Request::GetRangeValues { range } => Response::Values {
            values: adapter.range_values(&parse_range(&range)?).await?,
        },
        Request::SetRangeValues { range, values } => {
            let values = values.unwrap_or_default();
            adapter
                .set_range_values(&parse_range(&range)?, &values)
                .await?;
            Response::ok()
        }
    };
    Ok(response)
}

type Envelope = (Request, oneshot::Sender<Response>);

/// Cloneable sender side of a spawned [`Coordinator`]. Each `send` waits for
/// its own reply.
#[derive(Clone)]
pub struct RelayHandle {
    tx: mpsc::Sender<Envelope>,
}

impl RelayHandle {
    pub async fn send(&self, request: Request) -> Response {
        let (reply_tx, reply_rx) = oneshot::channel();
        if self.tx.send((request, reply_tx)).await.is_err() {
            return RelayError::Closed.into();
        }
        reply_rx.await.unwrap_or_else(|_| RelayError::Closed.into())
    }

    /// Parse and send a raw JSON message.
    pub async fn send_message(&self, message: serde_json::Value) -> Response {
        match Request::from_message(message) {
            Ok(request) => self.send(request).await,
            Err(e) => e.into(),
        }
    }
}
