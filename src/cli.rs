//! One-shot subcommands for scripting. Each command opens nothing itself; it
//! gets the connection `main` already opened.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use rusqlite::Connection;
use tracing::debug;

use the_choice::db::{
    add_item_to_list, create_item, create_item_list, delete_all_item_lists, delete_all_items,
    delete_item, delete_item_list, fetch_item_by_name, fetch_item_list_by_name, fetch_item_lists,
    fetch_items, fetch_items_for_list, fetch_or_create_item, fetch_settings,
    remove_item_from_list, rename_item, rename_item_list, seed_default_item_lists,
    seed_default_items,
};
use the_choice::{AppSettings, ChoiceMethod, ChoiceRequest, Chooser, ChooserError};

#[derive(Parser)]
#[command(
    name = "the-choice",
    about = "Let chance decide: pick from a list, throw a coin or roll a die",
    version
)]
pub struct Cli {
    /// SQLite database to use instead of ~/.the-choice/the-choice.sqlite
    #[arg(long, global = true, value_name = "PATH")]
    pub database: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Without a subcommand the interactive terminal UI starts
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Make one choice and print it
    Choose(ChooseArgs),

    /// Manage the item catalogue
    Items {
        #[command(subcommand)]
        action: ItemsAction,
    },

    /// Manage item lists and their members
    Lists {
        #[command(subcommand)]
        action: ListsAction,
    },

    /// Print the stored settings
    Settings,
}

#[derive(Args)]
pub struct ChooseArgs {
    /// Method to use (default: the last one used)
    #[arg(value_enum)]
    pub method: Option<MethodArg>,

    /// List to pick from (default: the last one used)
    #[arg(short, long)]
    pub list: Option<String>,

    /// Sides of the custom die (default: the last one used)
    #[arg(short, long, allow_negative_numbers = true)]
    pub range: Option<i64>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum MethodArg {
    List,
    Coin,
    Dice,
    Custom,
}

impl From<MethodArg> for ChoiceMethod {
    fn from(arg: MethodArg) -> Self {
        match arg {
            MethodArg::List => ChoiceMethod::FromList,
            MethodArg::Coin => ChoiceMethod::ThrowCoin,
            MethodArg::Dice => ChoiceMethod::RuleDice,
            MethodArg::Custom => ChoiceMethod::RuleCustomDice,
        }
    }
}

#[derive(Subcommand)]
pub enum ItemsAction {
    /// Print all items
    List,
    /// Add one or more items
    Add {
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// Rename an item
    Rename { old: String, new: String },
    /// Delete an item and its list memberships
    Remove { name: String },
    /// Delete every item
    Clear,
    /// Add the sample items
    Seed,
}

#[derive(Subcommand)]
pub enum ListsAction {
    /// Print all lists
    List,
    /// Create a list
    Add { name: String },
    /// Rename a list
    Rename { old: String, new: String },
    /// Delete a list (its items stay)
    Remove { name: String },
    /// Delete every list
    Clear,
    /// Print the items of a list
    Show { name: String },
    /// Add items to a list, creating missing items
    Link {
        list: String,
        #[arg(required = true)]
        items: Vec<String>,
    },
    /// Take an item out of a list
    Unlink { list: String, item: String },
    /// Add the default lists
    Seed,
}

pub fn run(command: Command, conn: &Connection) -> Result<()> {
    match command {
        Command::Choose(args) => choose(conn, args),
        Command::Items { action } => items(conn, action),
        Command::Lists { action } => lists(conn, action),
        Command::Settings => settings(conn),
    }
}

fn choose(conn: &Connection, args: ChooseArgs) -> Result<()> {
    let mut settings = AppSettings::load_or_create(conn).context("failed to load settings")?;
    let method = args.method.map(ChoiceMethod::from).unwrap_or(settings.choice_method);

    let list_name = match args.list {
        Some(name) => Some(name),
        None => remembered_or_first_list(conn, settings.default_list_name.as_deref())?,
    };

    let mut chooser = Chooser::new();
    chooser.set_last_custom_range(settings.custom_dice_range);
    let request = ChoiceRequest {
        method,
        list_name: list_name.as_deref(),
        custom_range: args.range.unwrap_or(settings.custom_dice_range),
    };

    match chooser.choose(conn, &request) {
        Ok(Some(choice)) => println!("{choice}"),
        Ok(None) => println!(
            "List \"{}\" has no items yet. Add some with `the-choice lists link`.",
            list_name.as_deref().unwrap_or_default()
        ),
        Err(ChooserError::NoListSelected) => {
            bail!("no lists yet; create one with `the-choice lists add NAME`")
        }
        Err(err) => return Err(err).context("failed to choose"),
    }

    settings.choice_method = method;
    settings.custom_dice_range = chooser.last_custom_range();
    if method == ChoiceMethod::FromList {
        settings.default_list_name = list_name;
    }
    settings.persist(conn).context("failed to save settings")?;
    Ok(())
}

/// The remembered list when it still exists, else the first list by name.
fn remembered_or_first_list(conn: &Connection, remembered: Option<&str>) -> Result<Option<String>> {
    let lists = fetch_item_lists(conn)?;
    let found = remembered.and_then(|name| lists.iter().find(|list| list.list_name == name));
    Ok(found
        .or_else(|| lists.first())
        .map(|list| list.list_name.clone()))
}

fn items(conn: &Connection, action: ItemsAction) -> Result<()> {
    match action {
        ItemsAction::List => {
            for item in fetch_items(conn)? {
                println!("{item}");
            }
        }
        ItemsAction::Add { names } => {
            for name in names {
                let item = create_item(conn, name.trim())?;
                debug!(id = item.id, name = %item.name, "item added");
                println!("Added \"{}\".", item.name);
            }
        }
        ItemsAction::Rename { old, new } => {
            let item = fetch_item_by_name(conn, &old)?;
            rename_item(conn, item.id, new.trim())?;
            println!("Renamed \"{old}\" to \"{}\".", new.trim());
        }
        ItemsAction::Remove { name } => {
            let item = fetch_item_by_name(conn, &name)?;
            delete_item(conn, item.id)?;
            println!("Deleted \"{name}\".");
        }
        ItemsAction::Clear => {
            let deleted = delete_all_items(conn)?;
            println!("Deleted {deleted} items.");
        }
        ItemsAction::Seed => {
            let added = seed_default_items(conn)?;
            println!("Added {added} default items.");
        }
    }
    Ok(())
}

fn lists(conn: &Connection, action: ListsAction) -> Result<()> {
    match action {
        ListsAction::List => {
            for list in fetch_item_lists(conn)? {
                println!("{list}");
            }
        }
        ListsAction::Add { name } => {
            let list = create_item_list(conn, name.trim())?;
            debug!(id = list.id, name = %list.list_name, "list added");
            println!("Added \"{}\".", list.list_name);
        }
        ListsAction::Rename { old, new } => {
            let list = fetch_item_list_by_name(conn, &old)?;
            rename_item_list(conn, list.id, new.trim())?;

            let mut settings = AppSettings::load_or_create(conn)?;
            if settings.default_list_name.as_deref() == Some(old.as_str()) {
                settings.default_list_name = Some(new.trim().to_string());
                settings.persist(conn)?;
            }
            println!("Renamed \"{old}\" to \"{}\".", new.trim());
        }
        ListsAction::Remove { name } => {
            let list = fetch_item_list_by_name(conn, &name)?;
            delete_item_list(conn, list.id)?;
            println!("Deleted \"{name}\".");
        }
        ListsAction::Clear => {
            let deleted = delete_all_item_lists(conn)?;
            println!("Deleted {deleted} lists.");
        }
        ListsAction::Show { name } => {
            let list = fetch_item_list_by_name(conn, &name)?;
            for item in fetch_items_for_list(conn, list.id)? {
                println!("{item}");
            }
        }
        ListsAction::Link { list, items } => {
            let list = fetch_item_list_by_name(conn, &list)?;
            for name in items {
                let item = fetch_or_create_item(conn, name.trim())?;
                match add_item_to_list(conn, list.id, item.id) {
                    Ok(_) => println!("Linked \"{}\" to \"{}\".", item.name, list.list_name),
                    Err(err) if err.is_duplicate() => {
                        println!("\"{}\" is already in \"{}\".", item.name, list.list_name)
                    }
                    Err(err) => return Err(err.into()),
                }
            }
        }
        ListsAction::Unlink { list, item } => {
            let list = fetch_item_list_by_name(conn, &list)?;
            let item = fetch_item_by_name(conn, &item)?;
            remove_item_from_list(conn, list.id, item.id)?;
            println!("Unlinked \"{}\" from \"{}\".", item.name, list.list_name);
        }
        ListsAction::Seed => {
            let added = seed_default_item_lists(conn)?;
            println!("Added {added} default lists.");
        }
    }
    Ok(())
}

fn settings(conn: &Connection) -> Result<()> {
    AppSettings::load_or_create(conn).context("failed to load settings")?;
    for setting in fetch_settings(conn)? {
        println!("{setting}");
    }
    Ok(())
}
