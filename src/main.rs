// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::Result;
use kube::Client;
use tracing::info;
use tracing_subscriber::EnvFilter;

use quarks_copier::config::Config;
use quarks_copier::kubernetes::wait_for_quarks_secret_crd;
use quarks_copier::reconcilers::QuarksSecretReconciler;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting QuarksSecret copier");

    let config = Config::from_env()?;
    info!(
        "Configuration loaded: ctx_timeout={:?}, watch_namespace={}",
        config.ctx_timeout,
        config.watch_namespace.as_deref().unwrap_or("<all>")
    );

    let client = Client::try_default().await?;
    info!("Connected to Kubernetes cluster");

    // Reconciling before the CRD exists would only produce list errors
    info!("Waiting for QuarksSecret CRD to become available...");
    wait_for_quarks_secret_crd(&client).await?;

    QuarksSecretReconciler::new(client, config).run().await?;

    // The controller stream ends on SIGTERM or Ctrl-C
    info!("QuarksSecret reconciler stopped");
    Ok(())
}
