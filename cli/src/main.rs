use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use haulit_app_lib::csv_export::export_invoices_csv;
use haulit_app_lib::numbering::preview_invoice_number;
use haulit_app_lib::totals::{invoice_total, outstanding_balance};
use haulit_app_lib::{
  AdditionalCost, Driver, DriverPatch, DriverStatus, HaulIt, Identity, Invoice, InvoiceStatus,
  NewDriver, NewInvoice, PaymentUpdate, SettingsPatch, StatusFilter,
};
use log::debug;

#[derive(Parser, Debug)]
#[command(name = "haulit", version, about = "Freight invoices for small trucking fleets")]
struct Cli {
  /// SQLite database file. Defaults to an existing haulit.db next to the
  /// binary or in the working directory.
  #[arg(long, env = "HAULIT_DB", global = true)]
  db: Option<PathBuf>,

  /// Repeat for more log output (-v info, -vv debug). RUST_LOG wins when set.
  #[arg(short, long, action = ArgAction::Count, global = true)]
  verbose: u8,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  Login {
    username: String,
    #[arg(long, env = "HAULIT_PASSWORD", hide_env_values = true)]
    password: String,
  },
  Logout,
  Whoami,
  #[command(subcommand)]
  User(UserCommand),
  #[command(subcommand)]
  Driver(DriverCommand),
  #[command(subcommand)]
  Broker(BrokerCommand),
  #[command(subcommand)]
  Invoice(InvoiceCommand),
  #[command(subcommand)]
  Settings(SettingsCommand),
}

#[derive(Subcommand, Debug)]
enum UserCommand {
  Add {
    username: String,
    #[arg(long)]
    password: String,
  },
  List,
  Remove {
    id: String,
  },
}

#[derive(Subcommand, Debug)]
enum DriverCommand {
  Add {
    #[arg(long)]
    name: String,
    #[arg(long)]
    truck: String,
    #[arg(long, default_value = "")]
    license: String,
    #[arg(long, default_value = "")]
    phone: String,
    #[arg(long, default_value = "")]
    email: String,
    #[arg(long, default_value = "active")]
    status: DriverStatus,
  },
  List {
    /// Only drivers that can be assigned to new invoices.
    #[arg(long)]
    active: bool,
  },
  Edit {
    id: String,
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    truck: Option<String>,
    #[arg(long)]
    license: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    status: Option<DriverStatus>,
  },
  Remove {
    id: String,
  },
}

#[derive(Subcommand, Debug)]
enum BrokerCommand {
  List,
  Suggest { query: String },
}

#[derive(Args, Debug)]
struct InvoiceFilter {
  /// Matches invoice number, load number, broker or driver.
  #[arg(long, default_value = "")]
  search: String,
  /// all, unpaid, partial or paid.
  #[arg(long, default_value = "all")]
  status: StatusFilter,
}

#[derive(Subcommand, Debug)]
enum InvoiceCommand {
  PreviewNumber {
    load: String,
  },
  Create {
    #[arg(long)]
    load: String,
    #[arg(long)]
    broker: String,
    /// Driver id, name or truck number.
    #[arg(long)]
    driver: String,
    #[arg(long, allow_negative_numbers = true)]
    rate: f64,
    #[arg(long, default_value = "")]
    pickup: String,
    #[arg(long, default_value = "")]
    delivery: String,
    #[arg(long, default_value = "")]
    pickup_date: String,
    #[arg(long, default_value = "")]
    delivery_date: String,
    #[arg(long, default_value = "")]
    notes: String,
    /// Extra charge as DESCRIPTION=AMOUNT; repeatable.
    #[arg(long = "cost", value_parser = parse_cost)]
    costs: Vec<AdditionalCost>,
    /// Print the route block on the PDF.
    #[arg(long)]
    route: bool,
    #[arg(long, env = "HAULIT_DOWNLOAD_DIR")]
    out_dir: Option<PathBuf>,
    /// Save the invoice without writing its PDF.
    #[arg(long)]
    no_pdf: bool,
  },
  List {
    #[command(flatten)]
    filter: InvoiceFilter,
  },
  Show {
    /// Invoice id or number.
    invoice: String,
  },
  Pay {
    invoice: String,
    #[arg(long, default_value = "paid")]
    status: InvoiceStatus,
    #[arg(long, default_value = "")]
    method: String,
    /// YYYY-MM-DD; today when omitted.
    #[arg(long, default_value = "")]
    date: String,
    /// Defaults to the invoice total.
    #[arg(long)]
    amount: Option<f64>,
  },
  Export {
    invoice: String,
    #[arg(long, env = "HAULIT_DOWNLOAD_DIR")]
    out_dir: Option<PathBuf>,
  },
  ExportCsv {
    #[arg(long)]
    output: PathBuf,
    #[command(flatten)]
    filter: InvoiceFilter,
  },
  Summary,
}

#[derive(Subcommand, Debug)]
enum SettingsCommand {
  Show,
  Set {
    #[arg(long)]
    issuer_name: Option<String>,
    #[arg(long)]
    issuer_tagline: Option<String>,
    #[arg(long)]
    issuer_address: Option<String>,
    #[arg(long)]
    issuer_phone: Option<String>,
    #[arg(long)]
    issuer_email: Option<String>,
    #[arg(long)]
    currency_symbol: Option<String>,
    #[arg(long)]
    payment_terms: Option<String>,
    /// data:image/...;base64,... or an empty string to remove the logo.
    #[arg(long)]
    logo_url: Option<String>,
    #[arg(long)]
    font_path: Option<String>,
    #[arg(long)]
    download_dir: Option<String>,
    #[arg(long)]
    show_route_info: Option<bool>,
    #[arg(long)]
    show_payment_status: Option<bool>,
    #[arg(long)]
    show_notes: Option<bool>,
  },
}

fn parse_cost(raw: &str) -> Result<AdditionalCost, String> {
  let (description, amount) = raw
    .rsplit_once('=')
    .ok_or_else(|| format!("expected DESCRIPTION=AMOUNT, got {raw:?}"))?;
  let amount: f64 = amount
    .trim()
    .parse()
    .map_err(|e| format!("invalid amount {amount:?}: {e}"))?;
  Ok(AdditionalCost::new(description.trim(), amount))
}

fn init_logging(verbose: u8) {
  let default_level = match verbose {
    0 => "warn",
    1 => "info",
    _ => "debug",
  };
  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
    .format_timestamp(None)
    .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
  let cli = Cli::parse();
  init_logging(cli.verbose);

  let app = HaulIt::open(cli.db.as_deref())?;
  app.bootstrap()?;

  match cli.command {
    Command::Login { username, password } => {
      if !app.auth.authenticate(&username, &password)? {
        anyhow::bail!("invalid username or password");
      }
      println!("logged in as {username}");
    }
    command => {
      let session = app
        .auth
        .current_session()?
        .ok_or_else(|| anyhow::anyhow!("not logged in; run `haulit login <username>` first"))?;
      debug!("session: {} ({:?})", session.username, session.role);
      run(&app, &session, command).await?;
    }
  }

  Ok(())
}

async fn run(app: &HaulIt, session: &Identity, command: Command) -> anyhow::Result<()> {
  match command {
    Command::Login { .. } => anyhow::bail!("already logged in as {}", session.username),
    Command::Logout => {
      app.auth.logout()?;
      println!("logged out");
    }
    Command::Whoami => println!("{} ({:?})", session.username, session.role),
    Command::User(cmd) => run_user(app, cmd)?,
    Command::Driver(cmd) => run_driver(app, cmd)?,
    Command::Broker(cmd) => run_broker(app, cmd)?,
    Command::Invoice(cmd) => run_invoice(app, cmd).await?,
    Command::Settings(cmd) => run_settings(app, cmd)?,
  }
  Ok(())
}

fn run_user(app: &HaulIt, cmd: UserCommand) -> anyhow::Result<()> {
  match cmd {
    UserCommand::Add { username, password } => {
      if !app.auth.add_user(&username, &password)? {
        anyhow::bail!("username {username:?} already exists");
      }
      println!("user {username} added");
    }
    UserCommand::List => {
      for u in app.auth.users()? {
        println!("{}  {:<20} {:?}", u.id, u.username, u.role);
      }
    }
    UserCommand::Remove { id } => {
      if !app.auth.delete_user(&id)? {
        anyhow::bail!("no user with id {id}");
      }
      println!("user {id} removed");
    }
  }
  Ok(())
}

fn print_driver(d: &Driver) {
  println!(
    "{}  {:<20} {:<10} {:<12} {:<16} {:<28} {}",
    d.id,
    d.name,
    d.truck_number,
    d.license_number,
    d.phone,
    d.email,
    d.status.as_str()
  );
}

fn run_driver(app: &HaulIt, cmd: DriverCommand) -> anyhow::Result<()> {
  match cmd {
    DriverCommand::Add {
      name,
      truck,
      license,
      phone,
      email,
      status,
    } => {
      let d = app.drivers.create(NewDriver {
        name,
        truck_number: truck,
        license_number: license,
        phone,
        email,
        status,
      })?;
      println!("driver {} added with id {}", d.name, d.id);
    }
    DriverCommand::List { active } => {
      let drivers = if active { app.drivers.active()? } else { app.drivers.list()? };
      for d in &drivers {
        print_driver(d);
      }
    }
    DriverCommand::Edit {
      id,
      name,
      truck,
      license,
      phone,
      email,
      status,
    } => {
      let patch = DriverPatch {
        name,
        truck_number: truck,
        license_number: license,
        phone,
        email,
        status,
      };
      match app.drivers.update(&id, patch)? {
        Some(d) => print_driver(&d),
        None => anyhow::bail!("no driver with id {id}"),
      }
    }
    DriverCommand::Remove { id } => {
      if !app.drivers.delete(&id)? {
        anyhow::bail!("no driver with id {id}");
      }
      println!("driver {id} removed");
    }
  }
  Ok(())
}

fn run_broker(app: &HaulIt, cmd: BrokerCommand) -> anyhow::Result<()> {
  let names = match cmd {
    BrokerCommand::List => app.brokers.list()?,
    BrokerCommand::Suggest { query } => app.brokers.suggest(&query)?,
  };
  for name in names {
    println!("{name}");
  }
  Ok(())
}

/// Accepts a driver id, a name or a truck number (case-insensitive).
fn resolve_driver(app: &HaulIt, key: &str) -> anyhow::Result<String> {
  let drivers = app.drivers.list()?;
  let key = key.trim();
  drivers
    .iter()
    .find(|d| d.id == key)
    .or_else(|| drivers.iter().find(|d| d.name.eq_ignore_ascii_case(key)))
    .or_else(|| drivers.iter().find(|d| d.truck_number.eq_ignore_ascii_case(key)))
    .map(|d| d.id.clone())
    .ok_or_else(|| anyhow::anyhow!("no driver matches {key:?}"))
}

fn find_invoice(app: &HaulIt, key: &str) -> anyhow::Result<Invoice> {
  app
    .invoices
    .find(key)?
    .ok_or_else(|| anyhow::anyhow!("no invoice with id or number {key:?}"))
}

fn print_invoice_row(inv: &Invoice) {
  println!(
    "{:<18} {:<10} {:<24} {:<16} {:>12.2} {:<8} {:>12.2}",
    inv.invoice_number,
    inv.load_number,
    inv.broker,
    inv.driver,
    invoice_total(inv),
    inv.status,
    outstanding_balance(inv)
  );
}

async fn run_invoice(app: &HaulIt, cmd: InvoiceCommand) -> anyhow::Result<()> {
  match cmd {
    InvoiceCommand::PreviewNumber { load } => println!("{}", preview_invoice_number(&load)),
    InvoiceCommand::Create {
      load,
      broker,
      driver,
      rate,
      pickup,
      delivery,
      pickup_date,
      delivery_date,
      notes,
      costs,
      route,
      out_dir,
      no_pdf,
    } => {
      let inv = app.invoices.create(NewInvoice {
        load_number: load,
        broker,
        driver_id: resolve_driver(app, &driver)?,
        rate: Some(rate),
        pickup_location: pickup,
        delivery_location: delivery,
        pickup_date,
        delivery_date,
        notes,
        additional_costs: costs,
        include_route_info: route,
      })?;
      println!("{} created, total {:.2}", inv.invoice_number, invoice_total(&inv));
      if !no_pdf {
        let path = app.export_invoice(&inv, out_dir.as_deref()).await?;
        println!("{}", path.display());
      }
    }
    InvoiceCommand::List { filter } => {
      for inv in app.invoices.search(&filter.search, filter.status)? {
        print_invoice_row(&inv);
      }
    }
    InvoiceCommand::Show { invoice } => {
      let inv = find_invoice(app, &invoice)?;
      println!("{}", serde_json::to_string_pretty(&inv)?);
      println!("total:   {:.2}", invoice_total(&inv));
      println!("balance: {:.2}", outstanding_balance(&inv));
    }
    InvoiceCommand::Pay {
      invoice,
      status,
      method,
      date,
      amount,
    } => {
      let inv = find_invoice(app, &invoice)?;
      let defaults = app.invoices.payment_defaults(&inv);
      let update = PaymentUpdate {
        status,
        method,
        date: if date.trim().is_empty() { defaults.date } else { date },
        amount: amount.or(if status == InvoiceStatus::Paid { defaults.amount } else { None }),
      };
      match app.invoices.update_payment(&inv.id, update)? {
        Some(updated) => print_invoice_row(&updated),
        None => anyhow::bail!("invoice {invoice} disappeared while updating"),
      }
    }
    InvoiceCommand::Export { invoice, out_dir } => {
      let inv = find_invoice(app, &invoice)?;
      let path = app.export_invoice(&inv, out_dir.as_deref()).await?;
      println!("{}", path.display());
    }
    InvoiceCommand::ExportCsv { output, filter } => {
      let invoices = app.invoices.search(&filter.search, filter.status)?;
      let path = export_invoices_csv(&invoices, &output).await?;
      println!("{} invoice(s) written to {}", invoices.len(), path.display());
    }
    InvoiceCommand::Summary => {
      let s = app.invoices.summary()?;
      println!("invoices:          {}", s.invoice_count);
      println!("outstanding:       {} ({:.2})", s.outstanding_count, s.outstanding_total);
      println!("collected:         {:.2}", s.collected_total);
    }
  }
  Ok(())
}

fn run_settings(app: &HaulIt, cmd: SettingsCommand) -> anyhow::Result<()> {
  let settings = match cmd {
    SettingsCommand::Show => app.settings()?,
    SettingsCommand::Set {
      issuer_name,
      issuer_tagline,
      issuer_address,
      issuer_phone,
      issuer_email,
      currency_symbol,
      payment_terms,
      logo_url,
      font_path,
      download_dir,
      show_route_info,
      show_payment_status,
      show_notes,
    } => app.update_settings(SettingsPatch {
      issuer_name,
      issuer_tagline,
      issuer_address,
      issuer_phone,
      issuer_email,
      currency_symbol,
      payment_terms,
      logo_url,
      font_path,
      download_dir,
      show_route_info,
      show_payment_status,
      show_notes,
    })?,
  };
  println!("{}", serde_json::to_string_pretty(&settings)?);
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use clap::CommandFactory;

  #[test]
  fn cli_definition_is_consistent() {
    Cli::command().debug_assert();
  }

  #[test]
  fn costs_parse_from_description_and_amount() {
    let c = parse_cost("Fuel Surcharge=85.50").unwrap();
    assert_eq!(c.description, "Fuel Surcharge");
    assert_eq!(c.amount, 85.5);
    assert_eq!(parse_cost("a=b=10").unwrap().description, "a=b");
    assert!(parse_cost("Detention").is_err());
    assert!(parse_cost("Detention=lots").is_err());
  }

  #[test]
  fn invoice_create_collects_repeated_costs() {
    let cli = Cli::try_parse_from([
      "haulit", "invoice", "create", "--load", "76430", "--broker", "ABC Logistics", "--driver",
      "TRK-001", "--rate", "650", "--cost", "Fuel=50", "--cost", "Detention=35", "--route",
    ])
    .unwrap();
    match cli.command {
      Command::Invoice(InvoiceCommand::Create { costs, route, rate, .. }) => {
        assert_eq!(costs.len(), 2);
        assert!(route);
        assert_eq!(rate, 650.0);
      }
      other => panic!("unexpected command {other:?}"),
    }
  }

  #[test]
  fn invoice_create_writes_pdf_unless_told_not_to() {
    let base = [
      "haulit", "invoice", "create", "--load", "76430", "--broker", "ABC Logistics", "--driver",
      "TRK-001", "--rate", "650",
    ];
    let cli = Cli::try_parse_from(base.iter().copied().chain(["--out-dir", "/tmp/invoices"])).unwrap();
    match cli.command {
      Command::Invoice(InvoiceCommand::Create { out_dir, no_pdf, .. }) => {
        assert_eq!(out_dir, Some(PathBuf::from("/tmp/invoices")));
        assert!(!no_pdf);
      }
      other => panic!("unexpected command {other:?}"),
    }

    let cli = Cli::try_parse_from(base.iter().copied().chain(["--no-pdf"])).unwrap();
    match cli.command {
      Command::Invoice(InvoiceCommand::Create { no_pdf, .. }) => assert!(no_pdf),
      other => panic!("unexpected command {other:?}"),
    }
  }

  #[tokio::test]
  async fn create_exports_the_invoice_pdf() {
    let dir = tempfile::tempdir().unwrap();
    let app = HaulIt::open(Some(&dir.path().join("haulit.db"))).unwrap();
    app.bootstrap().unwrap();
    let out = dir.path().join("out");
    run_invoice(
      &app,
      InvoiceCommand::Create {
        load: "76430".into(),
        broker: "ABC Logistics".into(),
        driver: "TRK-001".into(),
        rate: 650.0,
        pickup: String::new(),
        delivery: String::new(),
        pickup_date: String::new(),
        delivery_date: String::new(),
        notes: String::new(),
        costs: vec![AdditionalCost::new("Fuel Surcharge", 85.0)],
        route: false,
        out_dir: Some(out.clone()),
        no_pdf: false,
      },
    )
    .await
    .unwrap();

    let inv = &app.invoices.list().unwrap()[0];
    assert!(out.join(format!("Invoice-{}.pdf", inv.invoice_number)).exists());
  }

  #[test]
  fn list_filter_parses_status() {
    let cli = Cli::try_parse_from(["haulit", "invoice", "list", "--status", "partial"]).unwrap();
    match cli.command {
      Command::Invoice(InvoiceCommand::List { filter }) => {
        assert_eq!(filter.status, StatusFilter::Only(InvoiceStatus::Partial));
        assert_eq!(filter.search, "");
      }
      other => panic!("unexpected command {other:?}"),
    }
  }
}
