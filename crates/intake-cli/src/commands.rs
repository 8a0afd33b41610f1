use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use intake_client::{
    ApiClient, IntakeForm, Navigation, PatientQuery, PollEvent, ProgressView, StatusPoller,
    SubmitError, SubmitOutcome, run_indexing,
};
use intake_core::{IndexingStatus, IntakeRecord};

use crate::cli::{ListArgs, SubmitArgs, WatchArgs};
use crate::display;
use crate::files;

#[derive(Debug, PartialEq)]
enum Output {
    Stdout(String),
    Stderr(String),
}

/// Prints poll events in the detailed or the compact layout.
///
/// The detailed layout re-renders the last snapshot with the latest fetch
/// error until a fetch succeeds again.
struct ProgressPrinter<'a> {
    patient_name: &'a str,
    view: ProgressView,
    last_status: Option<IndexingStatus>,
    last_error: Option<String>,
}

impl<'a> ProgressPrinter<'a> {
    fn new(patient_name: &'a str, view: ProgressView) -> Self {
        Self {
            patient_name,
            view,
            last_status: None,
            last_error: None,
        }
    }

    fn render(&mut self, event: &PollEvent) -> Output {
        match event {
            PollEvent::Snapshot(status) => {
                self.last_error = None;
                self.last_status = Some(status.clone());
                match self.view {
                    ProgressView::Background => {
                        Output::Stderr(display::render_compact(self.patient_name, status))
                    }
                    _ => Output::Stdout(display::render_status(self.patient_name, status, None)),
                }
            }
            PollEvent::FetchFailed(message) => {
                self.last_error = Some(message.clone());
                match (&self.last_status, self.view) {
                    (Some(status), ProgressView::Expanded) => Output::Stdout(
                        display::render_status(self.patient_name, status, Some(message.as_str())),
                    ),
                    _ => Output::Stderr(format!("  error: {message}")),
                }
            }
            PollEvent::Completed(completion) => {
                Output::Stdout(display::render_completion(completion))
            }
        }
    }

    fn on_event(&mut self, event: &PollEvent) {
        match self.render(event) {
            Output::Stdout(text) => println!("{text}"),
            Output::Stderr(text) => eprintln!("{text}"),
        }
    }
}

fn view_for(background: bool) -> ProgressView {
    if background {
        ProgressView::Background
    } else {
        ProgressView::Expanded
    }
}

async fn navigate(navigation: Navigation) {
    tokio::time::sleep(navigation.delay).await;
    println!("Returning to {}", navigation.route);
}

async fn read_record(path: &Path) -> anyhow::Result<IntakeRecord> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

/// Fill in a form from the arguments, submit it, and follow indexing when the
/// backend accepted documents.
pub async fn submit(
    client: ApiClient,
    poll_interval: Duration,
    args: SubmitArgs,
) -> anyhow::Result<()> {
    let record = match &args.record {
        Some(path) => read_record(path).await?,
        None => IntakeRecord::new(),
    };
    let mut form = IntakeForm::with_record(record);
    for (field, value) in args.field_values() {
        form.set_field(field, value);
    }

    let selections = files::load_selections(&args.documents).await?;
    form.attach(selections);
    if !form.attachments().is_empty() {
        eprint!("{}", display::render_attachments(form.attachments()));
    }

    let outcome = match form.submit(&client).await {
        Ok(outcome) => outcome,
        Err(SubmitError::Validation(e)) => bail!("{e}"),
        Err(e) => return Err(e).context("creating patient"),
    };

    match outcome {
        SubmitOutcome::Created {
            patient,
            navigation,
        } => {
            println!(
                "Patient created: {} (id {})",
                patient.display_name(),
                patient.patient_id
            );
            navigate(navigation).await;
        }
        SubmitOutcome::Indexing {
            patient_id,
            patient_name,
        } => {
            println!("Patient created: {patient_name} (id {patient_id}), indexing documents");
            if args.follow.background {
                form.dismiss_progress();
            }
            let mut printer = ProgressPrinter::new(&patient_name, form.view());
            let (mut poller, mut events) =
                StatusPoller::new(Arc::new(client), patient_id.as_str(), poll_interval);
            let completion = run_indexing(&mut poller, &mut events, args.follow.timeout(), |ev| {
                printer.on_event(ev)
            })
            .await?;
            if let Some(navigation) = form.on_indexing_complete(&completion) {
                navigate(navigation).await;
            }
        }
    }
    Ok(())
}

pub async fn status(client: ApiClient, patient_id: &str) -> anyhow::Result<()> {
    let status = client
        .indexing_status(patient_id)
        .await
        .with_context(|| format!("fetching indexing status of patient {patient_id}"))?;
    print!(
        "{}",
        display::render_status(&format!("patient {patient_id}"), &status, None)
    );
    Ok(())
}

pub async fn watch(
    client: ApiClient,
    poll_interval: Duration,
    args: WatchArgs,
) -> anyhow::Result<()> {
    let name = format!("patient {}", args.patient_id);
    let mut printer = ProgressPrinter::new(&name, view_for(args.follow.background));
    let (mut poller, mut events) =
        StatusPoller::new(Arc::new(client), args.patient_id.as_str(), poll_interval);
    run_indexing(&mut poller, &mut events, args.follow.timeout(), |ev| {
        printer.on_event(ev)
    })
    .await?;
    Ok(())
}

/// Wait for the current run to settle, retry whatever failed, and follow the
/// new run.
pub async fn retry(
    client: ApiClient,
    poll_interval: Duration,
    args: WatchArgs,
) -> anyhow::Result<()> {
    let name = format!("patient {}", args.patient_id);
    let mut printer = ProgressPrinter::new(&name, view_for(args.follow.background));
    let timeout = args.follow.timeout();
    let (mut poller, mut events) =
        StatusPoller::new(Arc::new(client), args.patient_id.as_str(), poll_interval);

    let settled = run_indexing(&mut poller, &mut events, timeout, |ev| {
        printer.on_event(ev)
    })
    .await?;
    if settled.status.failed == 0 {
        println!("No failed documents to retry.");
        return Ok(());
    }

    let batch = poller.retry_failed().await;
    println!("Retrying {} failed document(s)", batch.requested);
    run_indexing(&mut poller, &mut events, timeout, |ev| {
        printer.on_event(ev)
    })
    .await?;
    Ok(())
}

pub async fn list(client: ApiClient, args: ListArgs) -> anyhow::Result<()> {
    let query = PatientQuery {
        search: args.search,
        is_active: args.active,
        page: args.page,
        page_size: args.page_size,
    };
    let page = client
        .list_patients(&query)
        .await
        .context("listing patients")?;
    print!("{}", display::render_patient_page(&page));
    Ok(())
}

pub async fn check_active(client: ApiClient, phone: &str) -> anyhow::Result<()> {
    let status = client
        .check_active(phone)
        .await
        .context("checking patient activation")?;
    print!("{}", display::render_activation(phone, &status));
    Ok(())
}
