use std::{error::Error, io::Write};

use clap::{Args, Parser, Subcommand};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal::{self, ClearType},
};
use engine::{Engine, IngredientListFilter};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection, EntityTrait, Set};

type CliResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

mod users {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "users")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub username: String,
        pub password: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

#[derive(Parser, Debug)]
#[command(name = "larder_admin")]
#[command(about = "Admin utilities for Larder (bootstrap users, inspect stock)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite:./larder.db?mode=rwc")]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    /// Print the pantry.
    Stock(StockArgs),
    /// Print every menu item's recipe.
    Recipes,
    /// Print revenue, cost and profit over all purchases.
    Report,
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    /// Create a user that can write through the API. Asks for the password.
    Create(UserCreateArgs),
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    username: String,
}

#[derive(Args, Debug)]
struct StockArgs {
    /// Only the N ingredients closest to running out.
    #[arg(long)]
    low: Option<u64>,
    /// Hide ingredients that ran out.
    #[arg(long)]
    available: bool,
}

/// Keeps the terminal in raw mode while alive.
struct RawMode;

impl RawMode {
    fn enter() -> CliResult<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn say(out: &mut std::io::Stderr, line: &str) -> CliResult<()> {
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(line),
        Print("\r\n")
    )?;
    Ok(())
}

/// Reads a line without echoing it, printing `*` per character.
fn read_hidden(prompt: &str) -> CliResult<String> {
    let _raw = RawMode::enter()?;
    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(prompt)
    )?;
    out.flush()?;

    let mut buf = String::new();
    loop {
        let Event::Key(KeyEvent {
            code, modifiers, ..
        }) = event::read()?
        else {
            continue;
        };

        match code {
            KeyCode::Enter => break,
            KeyCode::Backspace => {
                if buf.pop().is_some() {
                    execute!(out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?;
                }
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                execute!(out, Print("\r\n"))?;
                return Err("interrupted".into());
            }
            KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::CONTROL) => {
                buf.push(ch);
                execute!(out, Print("*"))?;
            }
            _ => continue,
        }
        out.flush()?;
    }

    execute!(out, Print("\r\n"))?;
    out.flush()?;
    Ok(buf)
}

fn ask_new_password() -> CliResult<String> {
    let mut out = std::io::stderr();
    for _ in 0..3 {
        let first = read_hidden("Password: ")?;
        if first.is_empty() {
            say(&mut out, "Password must not be empty.")?;
            continue;
        }
        if read_hidden("Confirm password: ")? == first {
            return Ok(first);
        }
        say(&mut out, "Passwords do not match. Try again.")?;
    }

    Err("too many attempts".into())
}

async fn connect_db(database_url: &str) -> CliResult<DatabaseConnection> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

async fn create_user(db: &DatabaseConnection, username: String) -> CliResult<()> {
    if users::Entity::find_by_id(username.clone())
        .one(db)
        .await?
        .is_some()
    {
        return Err(format!("user already exists: {username}").into());
    }

    let password = ask_new_password()?;
    let user = users::ActiveModel {
        username: Set(username.clone()),
        password: Set(password),
    };
    users::Entity::insert(user).exec(db).await?;

    println!("created user: {username}");
    Ok(())
}

async fn print_stock(engine: &Engine, args: StockArgs) -> CliResult<()> {
    let ingredients = match args.low {
        Some(limit) => engine.list_low_stock(limit).await?,
        None => {
            engine
                .list_ingredients(&IngredientListFilter {
                    available_only: args.available,
                    search: None,
                })
                .await?
        }
    };

    if ingredients.is_empty() {
        println!("no ingredients");
    }
    for ingredient in ingredients {
        println!(
            "{:<30} {:>10} {:<14} @ {}",
            ingredient.name,
            ingredient.quantity.to_string(),
            ingredient.unit_display(),
            ingredient.unit_price
        );
    }
    Ok(())
}

async fn print_recipes(engine: &Engine) -> CliResult<()> {
    for item in engine.list_menu_items(None).await? {
        println!("{} ({})", item.name, item.price);
        for line in engine.menu_item_recipe(item.id).await? {
            println!("  - {}", line.description());
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> CliResult<()> {
    let cli = Cli::parse();
    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db.clone()).build().await?;

    match cli.command {
        Command::User(User {
            command: UserCommand::Create(args),
        }) => create_user(&db, args.username).await?,
        Command::Stock(args) => print_stock(&engine, args).await?,
        Command::Recipes => print_recipes(&engine).await?,
        Command::Report => {
            let report = engine.profit_report().await?;
            println!("revenue: {}", report.total_revenue);
            println!("cost:    {}", report.total_cost);
            println!("profit:  {}", report.profit);
        }
    }

    Ok(())
}
