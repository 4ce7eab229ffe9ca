use anyhow::{anyhow, bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use farebox_booking::filter::{filter_bookings, BookingFilter};
use farebox_booking::models::PaymentField;
use farebox_booking::workflow::{ConfirmOutcome, PaymentWorkflow, HOME_REDIRECT_DELAY};
use farebox_client::api::ApiClient;
use farebox_client::app_config::Config;
use farebox_client::auth::{CredentialField, LoginForm, RegisterForm};
use farebox_client::session_file::FileSessionStore;
use farebox_core::session::{Session, SessionStore};
use farebox_shared::models::Booking;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "farebox", about = "Bus booking and payment client")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create an account on the booking service
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Log in and store the session token
    Login {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// List your bookings, optionally filtered by booking time
    Bookings {
        #[arg(long, value_enum, default_value_t = FilterArg::All)]
        filter: FilterArg,
        /// Custom range start (YYYY-MM-DD); requires --to to match anything
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Custom range end (YYYY-MM-DD); requires --from to match anything
        #[arg(long)]
        to: Option<NaiveDate>,
    },
    /// Pay for a booking
    Pay {
        booking_id: i64,
        #[arg(long)]
        name_on_card: String,
        #[arg(long)]
        card_number: String,
        #[arg(long)]
        expiry_date: String,
        #[arg(long)]
        cvv: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FilterArg {
    All,
    Today,
    Week,
    Month,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "farebox=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::load().context("Failed to load config")?;
    let client = Arc::new(ApiClient::new(
        config.api.base_url.clone(),
        Duration::from_secs(config.api.timeout_seconds),
    )?);
    let store = FileSessionStore::new(&config.session.file);

    match cli.command {
        Command::Register {
            username,
            email,
            password,
        } => {
            let mut form = RegisterForm::new();
            form.edit(CredentialField::Username, username);
            form.edit(CredentialField::Email, email);
            form.edit(CredentialField::Password, password);
            if !form.validate_all() {
                print_field_errors(form.errors().iter());
                bail!("Registration aborted");
            }
            client
                .register(form.username(), form.email(), form.password())
                .await?;
            println!("Registration successful! You can now login.");
        }

        Command::Login { username, password } => {
            let mut form = LoginForm::new();
            form.edit(CredentialField::Username, username);
            form.edit(CredentialField::Password, password);
            if !form.validate_all() {
                print_field_errors(form.errors().iter());
                bail!("Login aborted");
            }
            let session = client.login(form.username(), form.password()).await?;
            store.save(&session)?;
            println!("Login Success");
        }

        Command::Logout => {
            store.clear()?;
            println!("Logged out");
        }

        Command::Bookings { filter, from, to } => {
            let session = require_session(&store)?;
            let bookings = client.user_bookings(&session).await?;

            let descriptor = if from.is_some() || to.is_some() {
                BookingFilter::Custom {
                    start: from,
                    end: to,
                }
            } else {
                match filter {
                    FilterArg::All => BookingFilter::All,
                    FilterArg::Today => BookingFilter::Today,
                    FilterArg::Week => BookingFilter::ThisWeek,
                    FilterArg::Month => BookingFilter::ThisMonth,
                }
            };

            let shown = filter_bookings(&bookings, &descriptor, Local::now());
            print_bookings(&shown);
        }

        Command::Pay {
            booking_id,
            name_on_card,
            card_number,
            expiry_date,
            cvv,
        } => {
            let session = require_session(&store)?;
            let bookings = client.user_bookings(&session).await?;
            let booking = bookings
                .iter()
                .find(|b| b.id == booking_id)
                .ok_or_else(|| anyhow!("No booking with id {booking_id}"))?;

            println!("Bus: {}", booking.bus.bus_name);
            println!("Seat: {}", booking.seat.seat_number);

            let mut workflow = PaymentWorkflow::start(booking, client.clone());
            println!("Amount: \u{20b9}{}", workflow.form().amount());

            workflow.edit(PaymentField::NameOnCard, name_on_card);
            workflow.edit(PaymentField::CardNumber, card_number);
            workflow.edit(PaymentField::ExpiryDate, expiry_date);
            workflow.edit(PaymentField::Cvv, cvv);

            match workflow.confirm().await? {
                ConfirmOutcome::Invalid(errors) => {
                    print_field_errors(errors.iter());
                    bail!("Payment aborted");
                }
                ConfirmOutcome::Conflict { reason } => {
                    bail!("{reason}");
                }
                ConfirmOutcome::Failed { message } => {
                    bail!("{message}");
                }
                ConfirmOutcome::Confirmed { amount } => {
                    println!("Amount Paid: \u{20b9}{amount}");
                    let receipt = workflow.acknowledge()?;
                    tracing::info!(booking = receipt.booking, "Payment completed");
                    println!("Booking successful! Returning to your bookings...");
                    tokio::time::sleep(HOME_REDIRECT_DELAY).await;
                    let bookings = client.user_bookings(&session).await?;
                    print_bookings(&bookings);
                }
            }
        }
    }

    Ok(())
}

fn require_session(store: &FileSessionStore) -> Result<Session> {
    store
        .load()?
        .ok_or_else(|| anyhow!("Not logged in. Run `farebox login` first."))
}

fn print_field_errors<'a, F: FieldName>(errors: impl Iterator<Item = (F, &'a str)>) {
    for (field, message) in errors {
        eprintln!("{}: {}", field.as_str(), message);
    }
}

/// Field tags that know their wire name, for error printing.
trait FieldName {
    fn as_str(&self) -> &'static str;
}

impl FieldName for PaymentField {
    fn as_str(&self) -> &'static str {
        PaymentField::as_str(self)
    }
}

impl FieldName for CredentialField {
    fn as_str(&self) -> &'static str {
        CredentialField::as_str(self)
    }
}

fn print_bookings(bookings: &[Booking]) {
    if bookings.is_empty() {
        println!("No bookings found for the selected filter.");
        return;
    }
    for booking in bookings {
        let booked_at = booking
            .booking_time
            .with_timezone(&Local)
            .format("%a, %d %b %Y %H:%M");
        println!(
            "#{}  {} ({})  {} -> {}  seat {}  \u{20b9}{}  booked {}",
            booking.id,
            booking.bus.bus_name,
            booking.bus.number,
            booking.origin.as_deref().unwrap_or(&booking.bus.origin),
            booking
                .destination
                .as_deref()
                .unwrap_or(&booking.bus.destination),
            booking.seat.seat_number,
            booking.price.unwrap_or(booking.bus.price),
            booked_at
        );
    }
}
