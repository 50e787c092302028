//! Product search commands.
//!
//! Both commands drive the same debounced [`SearchBar`] the storefront
//! overlay uses, so piping several lines in quick succession only searches
//! for the last one.

use std::io::{self, Write};

use tienda_storefront::catalog::Catalog;
use tienda_storefront::error::AppError;
use tienda_storefront::search::{SearchBar, SearchSnapshot, SearchStatus};
use tienda_storefront::state::AppState;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;

use super::CommandError;
use super::catalog::write_product_line;

/// Search once and print the results.
pub async fn once(state: &AppState, query: &str) -> Result<(), CommandError> {
    let bar = state.search_bar();
    let mut rx = bar.subscribe();
    bar.set_visible(true);
    bar.set_query(query);

    let snapshot = loop {
        let snapshot = rx.borrow_and_update().clone();
        if snapshot.status != SearchStatus::Pending {
            break snapshot;
        }
        wait_for_change(&mut rx).await?;
    };
    bar.close();

    let mut out = io::stdout().lock();
    write_results(&mut out, &snapshot)?;
    Ok(())
}

/// Read queries from stdin, one per line, printing each settled result.
///
/// Ends at end of input once the last query has settled.
pub async fn interactive(state: &AppState) -> Result<(), CommandError> {
    let bar: SearchBar<Catalog> = state.search_bar();
    let mut rx = bar.subscribe();
    bar.set_visible(true);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut input_open = true;

    loop {
        tokio::select! {
            line = lines.next_line(), if input_open => match line? {
                Some(text) => bar.set_query(text),
                None => {
                    input_open = false;
                    if bar.status() != SearchStatus::Pending {
                        break;
                    }
                }
            },
            changed = rx.changed() => {
                changed.map_err(|_| AppError::Internal("search closed".to_string()))?;
                let snapshot = rx.borrow_and_update().clone();
                match snapshot.status {
                    SearchStatus::Loaded | SearchStatus::Error => {
                        let mut out = io::stdout().lock();
                        write_results(&mut out, &snapshot)?;
                        if !input_open {
                            break;
                        }
                    }
                    SearchStatus::Idle if !input_open => break,
                    SearchStatus::Idle | SearchStatus::Pending => {}
                }
            }
        }
    }

    bar.close();
    Ok(())
}

async fn wait_for_change(rx: &mut watch::Receiver<SearchSnapshot>) -> Result<(), AppError> {
    rx.changed()
        .await
        .map_err(|_| AppError::Internal("search closed".to_string()))
}

fn write_results(out: &mut impl Write, snapshot: &SearchSnapshot) -> io::Result<()> {
    let query = snapshot.query.trim();
    match snapshot.status {
        SearchStatus::Idle => Ok(()),
        SearchStatus::Error => writeln!(out, "Search for '{query}' failed"),
        SearchStatus::Loaded | SearchStatus::Pending if snapshot.results.is_empty() => {
            writeln!(out, "No products match '{query}'")
        }
        SearchStatus::Loaded | SearchStatus::Pending => {
            writeln!(out, "{} results for '{query}':", snapshot.results.len())?;
            for product in &snapshot.results {
                write_product_line(out, product)?;
            }
            Ok(())
        }
    }
}
