// src/cli.rs
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

use crate::api::auth::AuthSession;
use crate::api::Marketplace;
use crate::core::{ApiClient, BookmarkStore, HttpClient, LocalStore, ReqwestTransport, TokenStore};
use crate::environment::ClientConfig;
use crate::error::ApiError;
use crate::payment::SimulatedGateway;
use crate::types::application::ApplicationStatus;
use crate::types::job::{JobDraft, JobFilters};
use crate::types::payment::CardDetails;
use crate::types::rating::{NewRating, Rating, RatingKind};
use crate::types::user::UserType;
use crate::validation::{self, RegisterForm};
use crate::views::job_list::load_saved_jobs;
use crate::views::{paginate, ApplicationListState, JobListState, JobWizard, WizardStep};

#[derive(Parser)]
#[command(name = "restojob")]
#[command(about = "Browse and manage hospitality job offers from the terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Override the backend base URL from config.yaml
    #[arg(long)]
    pub api_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Log in and keep the session token
    Login { email: String, password: String },
    /// Create an account and keep the session token
    Register {
        email: String,
        password: String,
        confirm_password: String,
        /// candidat or etablissement
        #[arg(long)]
        user_type: UserType,
        #[arg(long, default_value = "")]
        first_name: String,
        #[arg(long, default_value = "")]
        last_name: String,
        #[arg(long, default_value = "")]
        establishment_name: String,
    },
    /// Forget the stored session token
    Logout,
    /// Ask for a password reset e-mail
    ForgotPassword { email: String },
    /// Set a new password with the token from the reset e-mail
    ResetPassword {
        token: String,
        password: String,
        confirm_password: String,
    },
    /// Change the password of the logged-in account
    ChangePassword {
        current_password: String,
        new_password: String,
        confirm_password: String,
    },
    /// Show the logged-in account
    Me,
    /// Browse job offers
    #[command(subcommand)]
    Jobs(JobsCommand),
    /// Apply to a job offer
    Apply {
        job_id: String,
        #[arg(long, default_value = "")]
        cover_letter: String,
    },
    /// List your applications (sent or received)
    Applications {
        /// Only show one status (French or English name)
        #[arg(long)]
        status: Option<String>,
    },
    /// Publish a job offer described in a YAML file, paying for a plan
    Publish {
        draft: PathBuf,
        #[arg(long)]
        plan: String,
        #[arg(long)]
        card_holder: String,
        #[arg(long)]
        card_number: String,
        /// MM/YY
        #[arg(long)]
        card_expiry: String,
        #[arg(long)]
        card_cvc: String,
    },
    /// List subscription plans
    Plans,
    /// Rate the other party of an application
    Rate {
        application_id: String,
        score: u8,
        comment: String,
        /// Who is rated: candidat or etablissement
        #[arg(long)]
        target: UserType,
        /// Per-skill or per-criterion score, e.g. `--detail service=4`
        #[arg(long = "detail", value_parser = parse_detail)]
        details: Vec<(String, u8)>,
    },
    #[command(subcommand)]
    Notifications(NotificationsCommand),
    #[command(subcommand)]
    Bookmarks(BookmarksCommand),
}

#[derive(Subcommand)]
pub enum JobsCommand {
    List {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        contract_type: Option<String>,
        #[arg(long)]
        sector: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    Show { job_id: String },
}

#[derive(Subcommand)]
pub enum NotificationsCommand {
    List,
    ReadAll,
}

#[derive(Subcommand)]
pub enum BookmarksCommand {
    Add { job_id: String },
    Remove { job_id: String },
    List {
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
}

fn parse_detail(raw: &str) -> Result<(String, u8), String> {
    let (name, score) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected name=score, got '{}'", raw))?;
    let score = score
        .trim()
        .parse::<u8>()
        .map_err(|_| format!("invalid score in '{}'", raw))?;
    Ok((name.trim().to_string(), score))
}

/// Turn an API failure into the message a user should read.
fn report(e: ApiError) -> anyhow::Error {
    error!("Request failed: {}", e);
    match e.user_message() {
        Some(message) => anyhow!(message),
        None => anyhow!(e),
    }
}

async fn login(market: &Marketplace, email: &str, password: &str) -> Result<AuthSession> {
    validation::validate_login(email, password)?;
    market.auth().login(email, password).await.map_err(report)
}

async fn register(market: &Marketplace, form: &RegisterForm) -> Result<AuthSession> {
    let request = form.validate()?;
    market.auth().register(&request).await.map_err(report)
}

async fn change_password(
    market: &Marketplace,
    current: &str,
    new_password: &str,
    confirm: &str,
) -> Result<Option<String>> {
    validation::validate_password_change(current, new_password, confirm)?;
    market
        .auth()
        .update_password(current, new_password)
        .await
        .map_err(report)
}

async fn reset_password(
    market: &Marketplace,
    token: &str,
    new_password: &str,
    confirm: &str,
) -> Result<Option<String>> {
    validation::validate_password_reset(new_password, confirm)?;
    market
        .auth()
        .reset_password(token, new_password)
        .await
        .map_err(report)
}

async fn rate(market: &Marketplace, rating: &NewRating) -> Result<Rating> {
    validation::validate_rating(rating.score, &rating.comment)?;
    market.ratings().create(rating).await.map_err(report)
}

pub async fn handle_command(cli: Cli, mut config: ClientConfig) -> Result<()> {
    if let Some(url) = cli.api_url {
        config.api_base_url = url;
    }
    info!("Using backend {}", config.api_base_url);

    let store = Arc::new(
        LocalStore::open(config.storage_path.clone()).context("Failed to open local storage")?,
    );
    let tokens = Arc::new(TokenStore::new(store.clone()));
    let bookmarks = BookmarkStore::new(store);
    let transport = Arc::new(ReqwestTransport::new(config.timeout())?);
    let client: Arc<dyn HttpClient> = Arc::new(ApiClient::new(&config, transport, tokens.clone()));
    let market = Marketplace::new(client);

    match cli.command {
        Command::Login { email, password } => {
            let session = login(&market, &email, &password).await?;
            tokens.save(&session.token)?;
            println!("✓ Logged in as {}", session.user.display_name());
        }

        Command::Register {
            email,
            password,
            confirm_password,
            user_type,
            first_name,
            last_name,
            establishment_name,
        } => {
            let form = RegisterForm {
                email,
                password,
                confirm_password,
                user_type: Some(user_type),
                first_name,
                last_name,
                establishment_name,
            };
            let session = register(&market, &form).await?;
            tokens.save(&session.token)?;
            println!("✓ Account created for {}", session.user.display_name());
        }

        Command::Logout => {
            tokens.clear()?;
            println!("✓ Logged out");
        }

        Command::ForgotPassword { email } => {
            let message = market.auth().forgot_password(&email).await.map_err(report)?;
            println!("✓ {}", message.unwrap_or_else(|| "Reset e-mail sent".to_string()));
        }

        Command::ResetPassword {
            token,
            password,
            confirm_password,
        } => {
            let message = reset_password(&market, &token, &password, &confirm_password).await?;
            println!("✓ {}", message.unwrap_or_else(|| "Password reset".to_string()));
        }

        Command::ChangePassword {
            current_password,
            new_password,
            confirm_password,
        } => {
            let message =
                change_password(&market, &current_password, &new_password, &confirm_password)
                    .await?;
            println!("✓ {}", message.unwrap_or_else(|| "Password updated".to_string()));
        }

        Command::Me => {
            let user = market.auth().current_user().await.map_err(report)?;
            println!("{} <{}> ({})", user.display_name(), user.email, user.user_type.as_str());
        }

        Command::Jobs(JobsCommand::List {
            search,
            location,
            contract_type,
            sector,
            page,
        }) => {
            let mut state = JobListState::new();
            state.set_filters(JobFilters {
                search,
                location,
                contract_type,
                sector,
                ..Default::default()
            });
            state.page = page.max(1);
            state.refresh(&market.jobs()).await;

            if let Some(message) = state.error.take() {
                return Err(anyhow!(message));
            }
            if state.jobs.is_empty() {
                println!("No job offers found.");
            }
            for job in &state.jobs {
                println!(
                    "{:<26} {:<40} {:<12} {}",
                    job.id, job.title, job.contract_type, job.location
                );
            }
            println!("Page {}/{}", state.page, state.total_pages);
        }

        Command::Jobs(JobsCommand::Show { job_id }) => {
            let job = market.jobs().get(&job_id).await.map_err(report)?;
            println!("{} ({})", job.title, job.contract_type);
            println!("  {} · {}", job.sector, job.location);
            if let Some(salary) = &job.salary {
                println!("  {:.2} {} / {}", salary.amount, salary.currency, salary.period);
            }
            if !job.required_skills.is_empty() {
                println!("  Compétences: {}", job.required_skills.join(", "));
            }
            println!();
            println!("{}", job.description);
            if bookmarks.is_saved(&job.id) {
                println!("★ saved");
            }
        }

        Command::Apply { job_id, cover_letter } => {
            validation::validate_cover_letter(&cover_letter)?;
            let application = market
                .applications()
                .apply(&job_id, &cover_letter)
                .await
                .map_err(report)?;
            println!("✓ Application {} sent ({})", application.id, application.status.label());
        }

        Command::Applications { status } => {
            let user = market.auth().current_user().await.map_err(report)?;
            let applications = market.applications();

            let mut state = ApplicationListState::new();
            state.status_filter = status
                .as_deref()
                .map(str::parse::<ApplicationStatus>)
                .transpose()
                .map_err(|e| anyhow!(e))?;

            if user.is_establishment() {
                state.load(applications.list_for_current_employer()).await;
            } else {
                state.load(applications.list_for_current_candidate()).await;
            }
            if let Some(message) = state.error.take() {
                return Err(anyhow!(message));
            }

            for app in state.visible() {
                println!(
                    "{:<26} {:<40} {}",
                    app.id,
                    app.job_title().unwrap_or(app.job.id()),
                    app.status.label()
                );
            }
            let summary: Vec<String> = state
                .counts()
                .iter()
                .map(|(status, count)| format!("{}: {}", status.label(), count))
                .collect();
            println!("{}", summary.join(" | "));
        }

        Command::Publish {
            draft,
            plan,
            card_holder,
            card_number,
            card_expiry,
            card_cvc,
        } => {
            let content = std::fs::read_to_string(&draft)
                .with_context(|| format!("Failed to read {}", draft.display()))?;
            let draft: JobDraft = serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse {}", draft.display()))?;

            let plans = market.payments().list_plans().await.map_err(report)?;
            let plan = plans
                .into_iter()
                .find(|p| p.id == plan)
                .ok_or_else(|| anyhow!("Unknown subscription plan: {}", plan))?;
            let card = CardDetails {
                holder: card_holder,
                number: card_number,
                expiry: card_expiry,
                cvc: card_cvc,
            };

            let mut wizard = JobWizard::with_draft(draft);
            wizard.go_to(WizardStep::Review)?;
            println!("Paying {:.2} {} for plan {}...", plan.price, plan.currency, plan.name);
            let gateway = SimulatedGateway::new(config.payment_delay());
            let job = wizard.submit(&gateway, &plan, &card, &market.jobs()).await?;
            println!("✓ Job offer published: {} ({})", job.title, job.id);
        }

        Command::Plans => {
            let plans = market.payments().list_plans().await.map_err(report)?;
            for plan in plans {
                println!(
                    "{:<12} {:<20} {:>8.2} {} / {} days",
                    plan.id, plan.name, plan.price, plan.currency, plan.duration_days
                );
            }
        }

        Command::Rate {
            application_id,
            score,
            comment,
            target,
            details,
        } => {
            let breakdown: BTreeMap<String, u8> = details.into_iter().collect();
            let kind = match target {
                UserType::Candidate => RatingKind::Candidate { skills: breakdown },
                UserType::Establishment => RatingKind::Establishment { criteria: breakdown },
            };
            let rating = rate(
                &market,
                &NewRating {
                    application_id,
                    score,
                    comment,
                    kind,
                },
            )
            .await?;
            println!("✓ Rating {} saved ({}/5)", rating.id, rating.score);
        }

        Command::Notifications(NotificationsCommand::List) => {
            let api = market.notifications();
            let notifications = api.list().await.map_err(report)?;
            let unread = api.unread_count().await.map_err(report)?;
            println!("{} unread", unread);
            for n in notifications {
                let marker = if n.read { " " } else { "•" };
                println!("{} [{}] {}", marker, n.kind, n.content);
            }
        }

        Command::Notifications(NotificationsCommand::ReadAll) => {
            let message = market.notifications().mark_all_read().await.map_err(report)?;
            println!("✓ {}", message.unwrap_or_else(|| "All notifications read".to_string()));
        }

        Command::Bookmarks(BookmarksCommand::Add { job_id }) => {
            if bookmarks.add(&job_id)? {
                println!("✓ Saved job {}", job_id);
            } else {
                println!("Job {} was already saved", job_id);
            }
        }

        Command::Bookmarks(BookmarksCommand::Remove { job_id }) => {
            if bookmarks.remove(&job_id)? {
                println!("✓ Removed job {}", job_id);
            } else {
                println!("Job {} was not saved", job_id);
            }
        }

        Command::Bookmarks(BookmarksCommand::List { page }) => {
            let saved = load_saved_jobs(&market.jobs(), &bookmarks)
                .await
                .map_err(report)?;
            let paged = paginate(&saved, page, 10);
            if paged.items.is_empty() {
                println!("No saved jobs.");
            }
            for job in paged.items {
                println!("{:<26} {:<40} {}", job.id, job.title, job.location);
            }
            println!("Page {}/{}", paged.page, paged.total_pages);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::{client_with, StubTransport};
    use clap::CommandFactory;
    use serde_json::json;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_publish() {
        let cli = Cli::try_parse_from([
            "restojob",
            "--api-url",
            "http://localhost:5000/api",
            "publish",
            "offer.yaml",
            "--plan",
            "standard",
            "--card-holder",
            "Le Bistrot",
            "--card-number",
            "4242424242424242",
            "--card-expiry",
            "12/29",
            "--card-cvc",
            "123",
        ])
        .unwrap();

        assert_eq!(cli.api_url.as_deref(), Some("http://localhost:5000/api"));
        match cli.command {
            Command::Publish { draft, plan, .. } => {
                assert_eq!(draft, PathBuf::from("offer.yaml"));
                assert_eq!(plan, "standard");
            }
            _ => panic!("expected publish"),
        }
    }

    #[test]
    fn test_parse_jobs_list_defaults_to_first_page() {
        let cli = Cli::try_parse_from(["restojob", "jobs", "list", "--location", "Lyon"]).unwrap();
        match cli.command {
            Command::Jobs(JobsCommand::List { location, page, .. }) => {
                assert_eq!(location.as_deref(), Some("Lyon"));
                assert_eq!(page, 1);
            }
            _ => panic!("expected jobs list"),
        }
    }

    fn market_with(stub: Arc<StubTransport>) -> Marketplace {
        Marketplace::new(Arc::new(client_with(stub, Some("jwt"))))
    }

    #[test]
    fn test_parse_rate_details() {
        let cli = Cli::try_parse_from([
            "restojob", "rate", "a1", "4", "Très bon service", "--target", "candidat",
            "--detail", "service=5", "--detail", "ponctualite=3",
        ])
        .unwrap();
        match cli.command {
            Command::Rate { target, details, .. } => {
                assert_eq!(target, UserType::Candidate);
                assert_eq!(details, vec![("service".to_string(), 5), ("ponctualite".to_string(), 3)]);
            }
            _ => panic!("expected rate"),
        }
        assert!(parse_detail("service").is_err());
        assert!(parse_detail("service=dix").is_err());
    }

    #[tokio::test]
    async fn test_invalid_forms_never_reach_backend() {
        let stub = Arc::new(StubTransport::new());
        let market = market_with(stub.clone());

        assert!(login(&market, "pas-un-email", "").await.is_err());

        let form = RegisterForm {
            email: "marie@example.fr".into(),
            password: "secret12".into(),
            confirm_password: "secret13".into(),
            user_type: Some(UserType::Candidate),
            first_name: "Marie".into(),
            last_name: "Dupont".into(),
            ..Default::default()
        };
        assert!(register(&market, &form).await.is_err());
        assert!(change_password(&market, "secret12", "secret12", "secret12").await.is_err());
        assert!(reset_password(&market, "tok", "abc", "abc").await.is_err());

        let rating = NewRating {
            application_id: "a1".into(),
            score: 9,
            comment: "Bien".into(),
            kind: RatingKind::Establishment {
                criteria: BTreeMap::new(),
            },
        };
        assert!(rate(&market, &rating).await.is_err());

        assert!(stub.requests().is_empty());
    }

    #[tokio::test]
    async fn test_valid_forms_are_sent() {
        let stub = Arc::new(StubTransport::new());
        let user = json!({"_id": "u1", "email": "marie@example.fr", "userType": "candidat"});
        stub.push_json(201, json!({"success": true, "token": "jwt-new", "user": user}));
        stub.push_json(200, json!({"success": true, "message": "Mot de passe modifié"}));
        stub.push_json(
            201,
            json!({"success": true, "rating": {
                "_id": "r3", "application": "a1", "score": 4, "comment": "Bien",
                "type": "etablissement", "criteria": {}
            }}),
        );
        let market = market_with(stub.clone());

        let form = RegisterForm {
            email: "marie@example.fr".into(),
            password: "secret12".into(),
            confirm_password: "secret12".into(),
            user_type: Some(UserType::Candidate),
            first_name: "Marie".into(),
            last_name: "Dupont".into(),
            ..Default::default()
        };
        let session = register(&market, &form).await.unwrap();
        assert_eq!(session.token, "jwt-new");
        assert!(stub.last_request().url.ends_with("/auth/register"));

        let message = change_password(&market, "secret12", "secret34", "secret34")
            .await
            .unwrap();
        assert_eq!(message.as_deref(), Some("Mot de passe modifié"));
        assert!(stub.last_request().url.ends_with("/auth/update-password"));

        let rating = NewRating {
            application_id: "a1".into(),
            score: 4,
            comment: "Bien".into(),
            kind: RatingKind::Establishment {
                criteria: BTreeMap::new(),
            },
        };
        assert_eq!(rate(&market, &rating).await.unwrap().id, "r3");
        assert!(stub.last_request().url.ends_with("/ratings"));
        assert_eq!(stub.requests().len(), 3);
    }
}
