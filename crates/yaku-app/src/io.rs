use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;

use crate::state::AppState;

pub enum InputSource {
    /// Translate once and finish
    Text(String),
    /// One request per line until EOF
    Stdin,
}

pub async fn input_loop(
    state: Arc<AppState>,
    source: InputSource,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let (from, to) = (
        state.config.translator.from_lang.clone(),
        state.config.translator.to_lang.clone(),
    );

    match source {
        InputSource::Text(text) => {
            println!("{}", state.pipeline.translate(&text, &from, &to).await?);
        }
        InputSource::Stdin => {
            tracing::info!(%from, %to, "Reading lines from stdin");
            let mut lines = BufReader::new(tokio::io::stdin()).lines();

            loop {
                let line = tokio::select! {
                    _ = cancel.cancelled() => break,
                    line = lines.next_line() => line?,
                };
                let Some(line) = line else {
                    break;
                };

                match state.pipeline.translate(&line, &from, &to).await {
                    Ok(translated) => println!("{}", translated),
                    Err(e) => {
                        tracing::error!("translation failed: {e}");
                        println!("{}", line);
                    }
                }
            }
        }
    }

    Ok(())
}
