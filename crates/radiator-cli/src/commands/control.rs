//! Get and set command implementations.
//!
//! Both commands open one session, run one operation and always close the
//! session again, whether the operation succeeded or not.

use std::io::Write;

use anyhow::{Context, Result};
use tracing::warn;

use radiator_core::{Connector, FirmwareProfile, Pin, Session, Transport};

use crate::cli::OutputFormat;
use crate::format::format_record;

/// The thermostat a command talks to.
#[derive(Debug, Clone)]
pub struct Target {
    pub address: String,
    pub pin: Pin,
    pub profile: FirmwareProfile,
}

async fn open<C: Connector>(connector: &C, target: &Target) -> Result<Session<C::Transport>> {
    let session =
        Session::prepare_with_profile(connector, &target.address, target.pin, target.profile)
            .await?;
    Ok(session)
}

async fn close<T: Transport + 'static>(session: Session<T>) {
    if let Err(e) = session.close().await {
        warn!("Failed to disconnect: {}", e);
    }
}

pub async fn cmd_get<C: Connector>(
    connector: &C,
    target: &Target,
    format: OutputFormat,
    out: &mut impl Write,
) -> Result<()> {
    let session = open(connector, target).await?;
    let state = session.get_state().await;
    close(session).await;

    let content = format_record(&state?, format)?;
    writeln!(out, "{}", content).context("Failed to write output")?;
    Ok(())
}

pub async fn cmd_set<C: Connector>(
    connector: &C,
    target: &Target,
    temperature: Option<f64>,
    offset: Option<f64>,
) -> Result<()> {
    let session = open(connector, target).await?;
    let result = session.set_state(temperature, offset).await;
    close(session).await;

    result?;
    Ok(())
}
