use std::path::Path;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use super::types::{IngestionError, Summary};
use crate::batch::{Batch, BatchPartitioner};
use crate::config::ReplayConfig;
use crate::console::ConsoleWriter;
use crate::record::{serialize_event, ReplayRecord};
use crate::sink::EventSink;

/// Replays one source file end-to-end: lines -> records -> events -> batches
/// -> sink, at a throttled rate, under the shared cancellation token.
///
/// The file is consumed lazily; memory stays bounded by one batch regardless
/// of file size. Exactly one header line is skipped. Sends are strictly
/// sequential; the token is checked after each send, so cancellation takes at
/// most one send plus one throttle delay to take effect. Parse and send
/// failures are fatal to this run only.
pub async fn run_source<R, S>(
    path: &Path,
    sink: &S,
    seed: u64,
    console: &ConsoleWriter,
    cancel: &CancellationToken,
    config: &ReplayConfig,
) -> Result<Summary, IngestionError>
where
    R: ReplayRecord,
    S: EventSink + ?Sized,
{
    let file = File::open(path)
        .await
        .map_err(|source| IngestionError::OpenSource {
            source_name: R::NAME,
            path: path.to_path_buf(),
            source,
        })?;
    let mut lines = BufReader::new(file).lines();

    let read_err = |line_number: usize, source| IngestionError::ReadLine {
        source_name: R::NAME,
        path: path.to_path_buf(),
        line_number,
        source,
    };

    // Skip exactly one header line. An empty file produces no batches.
    if lines
        .next_line()
        .await
        .map_err(|e| read_err(1, e))?
        .is_none()
    {
        console.write_line(format!("Created 0 total {} batches", R::NAME));
        return Ok(Summary::default());
    }

    let mut partitioner = BatchPartitioner::new(config.batch_capacity, None);
    let mut dispatcher = BatchDispatcher {
        sink,
        console,
        cancel,
        config,
        // Owned, per-run generator: concurrent runs never share rng state.
        rng: StdRng::seed_from_u64(seed),
        name: R::NAME,
        batches_sent: 0,
    };
    let mut lines_read = 0usize;
    let mut cancelled = false;

    while !cancelled {
        let Some(line) = lines
            .next_line()
            .await
            .map_err(|e| read_err(lines_read + 2, e))?
        else {
            break;
        };
        lines_read += 1;
        let line_number = lines_read + 1;

        let record = R::parse(&line).map_err(|source| IngestionError::InvalidRecord {
            source_name: R::NAME,
            line_number,
            source,
        })?;
        let event = serialize_event(&record).map_err(|source| IngestionError::Serialize {
            source_name: R::NAME,
            line_number,
            source,
        })?;
        let Some(batch) = partitioner
            .push(event)
            .map_err(|source| IngestionError::EventTooLarge {
                source_name: R::NAME,
                line_number,
                source,
            })?
        else {
            continue;
        };

        cancelled = dispatcher.dispatch(batch, lines_read).await?;
    }

    if !cancelled {
        if let Some(batch) = partitioner.finish() {
            cancelled = dispatcher.dispatch(batch, lines_read).await?;
        }
    }

    console.write_line(format!(
        "Created {} total {} batches",
        dispatcher.batches_sent,
        R::NAME
    ));

    Ok(Summary {
        lines_read,
        batches_sent: dispatcher.batches_sent,
        cancelled,
    })
}

/// Throttles, sends and reports one batch at a time for a single run.
struct BatchDispatcher<'a, S: ?Sized> {
    sink: &'a S,
    console: &'a ConsoleWriter,
    cancel: &'a CancellationToken,
    config: &'a ReplayConfig,
    rng: StdRng,
    name: &'static str,
    batches_sent: usize,
}

impl<S: EventSink + ?Sized> BatchDispatcher<'_, S> {
    /// Sends one batch; returns whether cancellation was observed afterwards.
    async fn dispatch(&mut self, batch: Batch, lines_read: usize) -> Result<bool, IngestionError> {
        // Randomized delay to simulate realistic arrival pacing. Suspends
        // only this pipeline.
        let delay = self
            .rng
            .gen_range(self.config.min_delay_ms..=self.config.max_delay_ms);
        sleep(Duration::from_millis(delay)).await;

        let batch_index = self.batches_sent + 1;
        self.sink
            .send(batch)
            .await
            .map_err(|source| IngestionError::SendFailed {
                source_name: self.name,
                batch_index,
                source,
            })?;
        self.batches_sent = batch_index;

        if batch_index % self.config.progress_interval == 0 {
            self.console
                .write_line(format!("{} lines consumed: {lines_read}", self.name));
            self.console
                .write_line(format!("Created {batch_index} {} batches", self.name));
        }

        Ok(self.cancel.is_cancelled())
    }
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
