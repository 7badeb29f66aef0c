use clap::Args;
use grantflow::error::AppError;
use grantflow::workflows::grants::{
    EligibilityGate, EligibilityResult, FeeSchedule, GrantCatalog, GrantFilter, GrantId,
};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct FeeQuoteArgs {
    /// Requested amount as written on the form, e.g. "$50,000 - $100,000"
    #[arg(long)]
    pub(crate) amount: String,
}

#[derive(Args, Debug)]
pub(crate) struct EligibilityCheckArgs {
    /// Grant seed file (JSON array of grant documents)
    #[arg(long)]
    pub(crate) grants: PathBuf,
    /// Grant id to check against
    #[arg(long)]
    pub(crate) grant: String,
    /// Comma separated answers in criterion order (yes/no)
    #[arg(long, default_value = "")]
    pub(crate) answers: String,
}

#[derive(Args, Debug)]
pub(crate) struct GrantListArgs {
    /// Grant seed file (JSON array of grant documents)
    #[arg(long)]
    pub(crate) grants: PathBuf,
    /// Only list grants in this category
    #[arg(long)]
    pub(crate) category: Option<String>,
    /// Case-insensitive match against grant title or organization
    #[arg(long)]
    pub(crate) search: Option<String>,
}

pub(crate) fn run_fee_quote(args: FeeQuoteArgs) -> Result<(), AppError> {
    let quote = FeeSchedule::STANDARD.quote_text(&args.amount);

    match quote.basis {
        Some(basis) => println!("Requested amount: {basis}"),
        None => println!("Requested amount: not recognized, minimum fee applies"),
    }
    println!("Application fee: {} ({} cents)", quote.display, quote.fee_cents);
    Ok(())
}

pub(crate) fn run_eligibility_check(args: EligibilityCheckArgs) -> Result<(), AppError> {
    let EligibilityCheckArgs {
        grants,
        grant,
        answers,
    } = args;

    let catalog = GrantCatalog::from_path(&grants)?;
    let grant_id = GrantId(grant);
    let grant = catalog
        .get(&grant_id)
        .ok_or_else(|| AppError::InvalidInput(format!("grant `{grant_id}` not found")))?;
    let answers = parse_answers(&answers)?;

    let mut gate = EligibilityGate::new(grant.eligibility.clone());
    let mut consumed = 0;
    for answer in &answers {
        if gate.state().is_terminal() {
            break;
        }
        let criterion = gate.current_criterion().unwrap_or_default().to_string();
        gate.answer(*answer)
            .map_err(|violation| AppError::InvalidInput(violation.to_string()))?;
        println!("  [{}] {criterion}", if *answer { "yes" } else { "no" });
        consumed += 1;
    }

    if consumed < answers.len() {
        println!(
            "Ignored {} answer(s) after the questionnaire finished",
            answers.len() - consumed
        );
    }

    println!("{} ({})", grant.title, grant.organization);
    match gate.result() {
        EligibilityResult::Eligible => println!("Result: eligible"),
        EligibilityResult::Ineligible { failed_step } => println!(
            "Result: ineligible at criterion {}: {}",
            failed_step + 1,
            grant.eligibility.get(failed_step).unwrap_or_default()
        ),
        EligibilityResult::Undetermined { next_step } => println!(
            "Result: undetermined, next criterion {}: {}",
            next_step + 1,
            grant.eligibility.get(next_step).unwrap_or_default()
        ),
    }
    Ok(())
}

pub(crate) fn run_grant_listing(args: GrantListArgs) -> Result<(), AppError> {
    let GrantListArgs {
        grants,
        category,
        search,
    } = args;

    let catalog = GrantCatalog::from_path(&grants)?;
    let filter = GrantFilter {
        category,
        search,
        open_on: None,
    };
    let schedule = FeeSchedule::STANDARD;

    let matches = catalog.filter(&filter);
    if matches.is_empty() {
        println!("No grants matched");
        return Ok(());
    }

    for grant in matches {
        let summary = grant.summary(&schedule);
        let deadline = summary
            .deadline
            .map(|date| date.to_string())
            .unwrap_or_else(|| "rolling".to_string());
        println!(
            "{:<16} {} | {} | deadline {} | {} criteria | fee {}",
            summary.id.0,
            summary.title,
            summary.amount,
            deadline,
            summary.criteria_count,
            summary.fee_display
        );
    }
    Ok(())
}

fn parse_answers(raw: &str) -> Result<Vec<bool>, AppError> {
    raw.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(parse_answer)
        .collect()
}

fn parse_answer(token: &str) -> Result<bool, AppError> {
    match token.to_ascii_lowercase().as_str() {
        "yes" | "y" | "true" | "1" => Ok(true),
        "no" | "n" | "false" | "0" => Ok(false),
        other => Err(AppError::InvalidInput(format!(
            "answer `{other}` must be yes or no"
        ))),
    }
}
