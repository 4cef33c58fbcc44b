use crate::infra::in_memory_admission_service;
use admission_sim::config::AppConfig;
use admission_sim::error::AppError;
use admission_sim::workflows::enrollment::{
    AdmissionServiceError, ApplicantName, ApplicantRecord, ScoreForm, SimulationAttempt,
    PASSING_AVERAGE,
};
use clap::Args;

#[derive(Args, Debug)]
pub(crate) struct EvaluateArgs {
    /// Mathematics score (non-negative integer)
    #[arg(long)]
    pub(crate) mathematics: String,
    /// Science score (non-negative integer)
    #[arg(long)]
    pub(crate) science: String,
    /// Social studies score (non-negative integer)
    #[arg(long)]
    pub(crate) social_studies: String,
    /// Indonesian language score (non-negative integer)
    #[arg(long)]
    pub(crate) indonesian: String,
    /// Travel distance to school in kilometres
    #[arg(long)]
    pub(crate) distance: Option<String>,
    /// Name printed alongside the verdict
    #[arg(long, default_value = "applicant")]
    pub(crate) name: String,
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Student name used for the scripted session
    #[arg(long, default_value = "Dewi")]
    pub(crate) student: String,
    /// Teacher access code used to open the applicant list
    #[arg(long)]
    pub(crate) teacher_code: Option<String>,
    /// Print the applicant list as CSV instead of a table
    #[arg(long)]
    pub(crate) csv: bool,
}

pub(crate) fn run_evaluate(args: EvaluateArgs) -> Result<(), AppError> {
    let EvaluateArgs {
        mathematics,
        science,
        social_studies,
        indonesian,
        distance,
        name,
    } = args;

    let mut form = ScoreForm::new(mathematics, science, social_studies, indonesian);
    form.distance = distance;

    let name = ApplicantName::parse(&name).map_err(AdmissionServiceError::from)?;
    let record = form.registration_record(name)?;
    let average = record.average()?;
    let verdict = record.verdict()?;

    render_record(&record);
    println!(
        "Average {:.2} (pass mark above {:.0}) -> {}",
        average,
        PASSING_AVERAGE,
        verdict.label()
    );
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        student,
        teacher_code,
        csv,
    } = args;

    let config = AppConfig::load()?.admission;
    let teacher_code = teacher_code.unwrap_or_else(|| config.teacher_code.clone());
    let service = in_memory_admission_service(&config);

    println!("Admission simulator demo");
    let ticket = service.start_session(None, &student)?;
    let session = ticket.session_id;
    println!("- {} signed in (session {})", ticket.identity, session);

    let what_ifs = [
        ScoreForm::new("80", "70", "60", "50"),
        ScoreForm::new("80", "70", "70", "60"),
        ScoreForm::new("80", "seventy", "70", "60"),
    ];
    println!("\nSimulations");
    for form in &what_ifs {
        match service.simulate(&session, form) {
            Ok(outcome) => render_attempt(&outcome.attempt),
            Err(err) => println!("  rejected form: {}", err),
        }
    }

    println!("\nRegistration");
    for form in [
        ScoreForm::new("85", "78", "72", "90").with_distance("-3"),
        ScoreForm::new("85", "78", "72", "90").with_distance("3.4"),
        ScoreForm::new("10", "10", "10", "10").with_distance("1"),
    ] {
        match service.register(&session, &form) {
            Ok(outcome) if outcome.newly_registered => {
                println!("  registered {}", outcome.record.name)
            }
            Ok(outcome) => println!("  {} is already registered", outcome.record.name),
            Err(err) => println!("  rejected form: {}", err),
        }
    }

    let history = service.history(&session)?;
    println!("\nHistory for {} ({} attempts)", ticket.identity, history.len());
    for attempt in &history {
        render_attempt(attempt);
    }

    println!("\nTeacher view");
    if let Err(err) = service.teacher_sign_in(Some(session), "wrong-code") {
        println!("  wrong code: {}", err);
    }
    service.teacher_sign_in(Some(session), &teacher_code)?;

    if csv {
        print!("{}", service.export_applicants_csv(&session)?);
    } else {
        for record in service.applicants(&session)? {
            render_record(&record);
        }
    }

    Ok(())
}

fn render_record(record: &ApplicantRecord) {
    let view = record.view();
    let score = |value: Option<u32>| value.map_or_else(|| "-".to_string(), |v| v.to_string());
    let distance = view
        .distance
        .map_or_else(|| "-".to_string(), |km| format!("{km:.1} km"));
    println!(
        "  {:<16} MAT {:>3} | SCI {:>3} | SOC {:>3} | IND {:>3} | distance {}",
        view.name,
        score(view.mathematics),
        score(view.science),
        score(view.social_studies),
        score(view.indonesian),
        distance
    );
}

fn render_attempt(attempt: &SimulationAttempt) {
    println!(
        "  {} average {:.2} -> {}",
        attempt.recorded_at.format("%H:%M:%S"),
        attempt.average,
        attempt.verdict.label()
    );
}
