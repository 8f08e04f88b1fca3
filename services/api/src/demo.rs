use crate::infra::{default_progress_config, InMemoryContextProvider, InMemorySessionRepository};
use clap::Args;
use std::sync::Arc;

use intake_ai::assessment::{
    AssessmentService, AssessmentServiceError, TurnAuthor, UserContext, UserId,
};
use intake_ai::error::AppError;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// User id the demo conversation is attributed to
    #[arg(long, default_value = "demo-patient")]
    pub(crate) user: String,
    /// Stop after six messages and finish through the manual-completion gate
    #[arg(long)]
    pub(crate) finish_early: bool,
}

const SCRIPT: &[(TurnAuthor, &str)] = &[
    (TurnAuthor::Attendant, "What brings you in today?"),
    (
        TurnAuthor::Patient,
        "I have a constant headache and sharp ear pain; I can describe the symptoms in detail.",
    ),
    (TurnAuthor::Attendant, "Any relevant medical history?"),
    (
        TurnAuthor::Patient,
        "I was diagnosed with an ear infection last year and had surgery; I'll be thorough about my treatment.",
    ),
    (TurnAuthor::Attendant, "Do you take any medication?"),
    (
        TurnAuthor::Patient,
        "No regular medication, and nothing like this runs in the family.",
    ),
    (TurnAuthor::Attendant, "How does this affect your daily life?"),
    (
        TurnAuthor::Patient,
        "The ringing interferes with sleep and conversation at work.",
    ),
    (
        TurnAuthor::Attendant,
        "Anything about noise exposure or smoking?",
    ),
    (
        TurnAuthor::Patient,
        "I work around loud noise exposure and I smoke occasionally.",
    ),
    (
        TurnAuthor::Attendant,
        "Thank you, that completes our assessment.",
    ),
];

/// Shorter exchange for the early-finish path: enough signal for the manual
/// gate (score 65 across six messages) with no question left open.
const EARLY_SCRIPT: &[(TurnAuthor, &str)] = &[
    (TurnAuthor::Attendant, "What brings you in today?"),
    (
        TurnAuthor::Patient,
        "I get sharp pain and headache symptoms; here is every detail.",
    ),
    (TurnAuthor::Attendant, "Any medical history I should know?"),
    (
        TurnAuthor::Patient,
        "I was diagnosed with a thyroid condition and had treatment; I will be thorough.",
    ),
    (TurnAuthor::Attendant, "Understood, thank you."),
    (TurnAuthor::Patient, "Thanks."),
];

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let repository = Arc::new(InMemorySessionRepository::default());
    let contexts = Arc::new(InMemoryContextProvider::default());
    contexts.seed(
        UserId(args.user.clone()),
        UserContext {
            hearing_status: Some("screened last spring, mild loss".to_string()),
            ..UserContext::default()
        },
    );
    let service = AssessmentService::new(repository, contexts, default_progress_config());

    let session = service
        .start_session(UserId(args.user.clone()))
        .map_err(AppError::from)?;
    println!("started assessment {} for {}", session.id, args.user);
    println!();

    let script = if args.finish_early { EARLY_SCRIPT } else { SCRIPT };
    for (author, text) in script.iter() {
        let receipt = match author {
            TurnAuthor::Patient => service.append_patient_turn(&session.id, text.to_string()),
            TurnAuthor::Attendant => service.append_attendant_turn(&session.id, text.to_string()),
        }
        .map_err(AppError::from)?;
        println!("[{:>9}] {}", author.label(), text);
        println!(
            "            score {:>3}  stage {:<17}  locked {}",
            receipt.score,
            receipt.stage.label(),
            receipt.locked
        );
    }

    println!();
    if args.finish_early {
        let receipt = service
            .request_manual_completion(&session.id)
            .map_err(AppError::from)?;
        println!(
            "manual completion granted: score {} stage {}",
            receipt.score,
            receipt.stage.label()
        );
    }

    let progress = service.progress(&session.id).map_err(AppError::from)?;
    println!(
        "final state: score {} stage {} locked {} messages {}",
        progress.score,
        progress.stage.label(),
        progress.locked,
        progress.message_count
    );
    println!(
        "report gate: can_generate_report={} can_manually_complete={}",
        progress.can_generate_report, progress.can_manually_complete
    );
    if !progress.outstanding_topics.is_empty() {
        let outstanding: Vec<&str> = progress
            .outstanding_topics
            .iter()
            .map(|topic| topic.label())
            .collect();
        println!("topics still open: {}", outstanding.join(", "));
    }

    match service.append_patient_turn(&session.id, "wait, one more thing".to_string()) {
        Err(AssessmentServiceError::SessionLocked) => {
            println!("late patient message rejected: session is locked");
        }
        Ok(receipt) => {
            println!(
                "late patient message accepted (score {} stage {})",
                receipt.score,
                receipt.stage.label()
            );
        }
        Err(other) => return Err(AppError::from(other)),
    }

    Ok(())
}
