mod cli;
mod logging;
mod report;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use videojob_engine::{
    ChannelPollSink, FileSessionStorage, JobPoller, ReqwestStatusClient, ResultStore,
    SessionTracker,
};
use videojob_logging::{videojob_error, videojob_info};

use crate::cli::Args;

const INTERRUPTED: u8 = 130;

fn main() -> ExitCode {
    let args = Args::parse();
    logging::initialize(args.log.into(), args.log_level());

    match run(args) {
        Ok(code) => code,
        Err(err) => {
            videojob_error!("{:#}", err);
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> anyhow::Result<ExitCode> {
    // One job, one poll loop: a current-thread runtime is all it needs.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    runtime.block_on(track(args))
}

async fn track(args: Args) -> anyhow::Result<ExitCode> {
    let client = ReqwestStatusClient::new(args.client_settings())
        .with_context(|| format!("cannot use api url {:?}", args.api_url))?;
    let storage = Arc::new(FileSessionStorage::new(&args.session_dir));
    let store = Arc::new(ResultStore::load(storage));
    let tracker = SessionTracker::new(JobPoller::new(
        Arc::new(client),
        store,
        args.poll_settings(),
    ));

    let (sink, mut events) = ChannelPollSink::channel();
    let sink = Arc::new(sink);
    let initial = args.initial_result()?;
    let handle = match (args.job_id.clone(), initial) {
        (Some(job_id), initial) => tracker.start_tracking(job_id, initial, sink),
        (None, Some(result)) => tracker.track_submission(result, sink),
        (None, None) => match tracker.resume(sink) {
            Some(handle) => handle,
            None => {
                println!(
                    "No job recorded in {}; nothing to track.",
                    args.session_dir.display()
                );
                return Ok(ExitCode::SUCCESS);
            }
        },
    };
    videojob_info!("Tracking job {:?}", handle.job_id());

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(event) => {
                    if let Some(line) = report::event_line(&event) {
                        println!("{line}");
                    }
                }
                None => break,
            },
            _ = &mut ctrl_c => {
                handle.cancel();
                println!(
                    "Stopped tracking {}; run again without arguments to resume.",
                    handle.job_id()
                );
                return Ok(ExitCode::from(INTERRUPTED));
            }
        }
    }

    match handle.wait().await {
        Some(Ok(result)) => {
            println!("\nVideo ready.\n{}", report::result_summary(&result));
            Ok(ExitCode::SUCCESS)
        }
        Some(Err(err)) => {
            eprintln!("{err}");
            if let Some(partial) = tracker.current() {
                println!("{}", report::result_summary(&partial));
            }
            Ok(ExitCode::from(report::failure_exit_code(&err)))
        }
        None => Ok(ExitCode::SUCCESS),
    }
}
