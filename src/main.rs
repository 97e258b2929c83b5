use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::debug;

use addressbook_rs::commands::{Command, EditPersonDescriptor};
use addressbook_rs::config::Config;
use addressbook_rs::date::parse_date;
use addressbook_rs::logging::init_logging;
use addressbook_rs::predicate::{EventField, EventKeywordPredicate, PersonField, PersonKeywordPredicate};
use addressbook_rs::storage::data_file_schema;
use addressbook_rs::tag::{parse_tags, Tag};
use addressbook_rs::{Event, ModelManager, Person, PersonSortKey, Relationship};

/// Personal address book of persons, relationships and events.
///
/// Indexes are one-based positions in the full list, as printed by the
/// list commands.
#[derive(Parser, Debug)]
#[command(name = "addressbook-rs", version, about)]
struct Cli {
    /// Data file (.json); defaults to $ADDRESSBOOK_FILE_PATH or the platform data dir
    #[arg(long, global = true)]
    data_file: Option<PathBuf>,

    /// Append logs to this file (also $ADDRESSBOOK_LOG_FILE)
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Disable console logging
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand, Debug)]
enum CliCommand {
    /// Add a person
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        social: Option<String>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    /// Edit the person at INDEX
    Edit {
        index: usize,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        social: Option<String>,
        #[arg(long)]
        address: Option<String>,
        /// Replace all tags
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// Remove all tags
        #[arg(long, conflicts_with = "tags")]
        clear_tags: bool,
    },
    /// Delete the person at INDEX with their relationships and event entries
    Delete { index: usize },
    /// List all persons
    List,
    /// Find persons whose field contains any keyword (case-insensitive)
    Find {
        #[arg(long, value_enum, default_value_t = PersonFieldArg::Name)]
        field: PersonFieldArg,
        #[arg(required = true)]
        keywords: Vec<String>,
    },
    /// Sort persons
    Sort {
        #[arg(value_enum, default_value_t = SortArg::Name)]
        by: SortArg,
    },
    /// Relate two persons by id
    Relate {
        first: String,
        second: String,
        /// Name read from FIRST to SECOND
        forward: String,
        /// Name read from SECOND to FIRST (defaults to FORWARD)
        #[arg(long)]
        reverse: Option<String>,
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    /// Delete the relationship NAME between two person ids (either order)
    Unrelate {
        first: String,
        second: String,
        name: String,
    },
    /// List relationships, optionally only those of the person at INDEX
    Relationships { index: Option<usize> },
    /// Add an event
    AddEvent {
        #[arg(long)]
        title: String,
        /// YYYY-MM-DD or "YYYY-MM-DD HH:MM"
        #[arg(long)]
        date: String,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// Person index to add as contact (repeatable)
        #[arg(long = "contact")]
        contacts: Vec<usize>,
    },
    /// Delete the event at INDEX
    DeleteEvent { index: usize },
    /// List all events
    Events,
    /// Find events whose field contains any keyword (case-insensitive)
    FindEvent {
        #[arg(long, value_enum, default_value_t = EventFieldArg::Title)]
        field: EventFieldArg,
        #[arg(required = true)]
        keywords: Vec<String>,
    },
    /// Add a tag to the event at INDEX
    TagEvent { index: usize, tag: String },
    /// Add the person at PERSON_INDEX to the event at EVENT_INDEX
    AddContact {
        event_index: usize,
        person_index: usize,
    },
    /// Delete everything
    Clear,
    /// Print the JSON Schema of the data file
    Schema,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum PersonFieldArg {
    Name,
    Phone,
    Social,
    Address,
    Tag,
}

impl From<PersonFieldArg> for PersonField {
    fn from(arg: PersonFieldArg) -> Self {
        match arg {
            PersonFieldArg::Name => PersonField::Name,
            PersonFieldArg::Phone => PersonField::Phone,
            PersonFieldArg::Social => PersonField::Social,
            PersonFieldArg::Address => PersonField::Address,
            PersonFieldArg::Tag => PersonField::Tag,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum EventFieldArg {
    Title,
    Location,
    Description,
    Tag,
    Contact,
}

impl From<EventFieldArg> for EventField {
    fn from(arg: EventFieldArg) -> Self {
        match arg {
            EventFieldArg::Title => EventField::Title,
            EventFieldArg::Location => EventField::Location,
            EventFieldArg::Description => EventField::Description,
            EventFieldArg::Tag => EventField::Tag,
            EventFieldArg::Contact => EventField::Contact,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum SortArg {
    Name,
    Phone,
    Social,
    Address,
}

impl From<SortArg> for PersonSortKey {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Name => PersonSortKey::Name,
            SortArg::Phone => PersonSortKey::Phone,
            SortArg::Social => PersonSortKey::Social,
            SortArg::Address => PersonSortKey::Address,
        }
    }
}

/// Split raw keyword arguments on whitespace, dropping empties
fn tokenize(raw: Vec<String>) -> Vec<String> {
    raw.iter()
        .flat_map(|arg| arg.split_whitespace())
        .map(str::to_string)
        .collect()
}

/// Translate parsed arguments into a model command
fn to_command(command: CliCommand, manager: &ModelManager) -> Result<Command> {
    let command = match command {
        CliCommand::Add {
            name,
            phone,
            social,
            address,
            tags,
        } => {
            let mut builder = Person::builder(name, phone).tags(parse_tags(tags)?);
            if let Some(social) = social {
                builder = builder.social(social);
            }
            if let Some(address) = address {
                builder = builder.address(address);
            }
            Command::AddPerson(builder.build()?)
        }
        CliCommand::Edit {
            index,
            name,
            phone,
            social,
            address,
            tags,
            clear_tags,
        } => {
            let tags = if clear_tags {
                Some(Vec::new())
            } else if tags.is_empty() {
                None
            } else {
                Some(parse_tags(tags)?)
            };
            Command::EditPerson {
                index,
                edit: EditPersonDescriptor {
                    name,
                    phone,
                    social,
                    address,
                    tags,
                },
            }
        }
        CliCommand::Delete { index } => Command::DeletePerson { index },
        CliCommand::List => Command::ListPersons,
        CliCommand::Find { field, keywords } => {
            Command::FindPersons(PersonKeywordPredicate::new(field.into(), tokenize(keywords)))
        }
        CliCommand::Sort { by } => Command::SortPersons(by.into()),
        CliCommand::Relate {
            first,
            second,
            forward,
            reverse,
            tags,
        } => {
            let mut builder = Relationship::builder()
                .user1(first)
                .user2(second)
                .forward_name(forward)
                .tags(parse_tags(tags)?);
            if let Some(reverse) = reverse {
                builder = builder.reverse_name(reverse);
            }
            Command::AddRelationship(builder.build()?)
        }
        CliCommand::Unrelate {
            first,
            second,
            name,
        } => Command::DeleteRelationship {
            first,
            second,
            name,
        },
        CliCommand::Relationships { index } => Command::ListRelationships { index },
        CliCommand::AddEvent {
            title,
            date,
            location,
            description,
            tags,
            contacts,
        } => {
            let date = parse_date(&date)?;
            let mut builder = Event::builder(title, date).tags(parse_tags(tags)?);
            if let Some(location) = location {
                builder = builder.location(location);
            }
            if let Some(description) = description {
                builder = builder.description(description);
            }
            for index in contacts {
                let person = manager
                    .person_at(index)
                    .ok_or_else(|| anyhow!("The person index provided is invalid: {}", index))?;
                builder = builder.contact(person.clone());
            }
            Command::AddEvent(builder.build()?)
        }
        CliCommand::DeleteEvent { index } => Command::DeleteEvent { index },
        CliCommand::Events => Command::ListEvents,
        CliCommand::FindEvent { field, keywords } => {
            Command::FindEvents(EventKeywordPredicate::new(field.into(), tokenize(keywords)))
        }
        CliCommand::TagEvent { index, tag } => Command::TagEvent {
            index,
            tag: Tag::new(tag)?,
        },
        CliCommand::AddContact {
            event_index,
            person_index,
        } => Command::AddContactToEvent {
            event_index,
            person_index,
        },
        CliCommand::Clear => Command::Clear,
        CliCommand::Schema => bail!("schema does not operate on the address book"),
    };
    Ok(command)
}

fn run(command: CliCommand, config: &Config) -> Result<()> {
    if let CliCommand::Schema = command {
        println!("{}", data_file_schema()?);
        return Ok(());
    }

    let mut manager = ModelManager::open(config.data_file.clone())
        .with_context(|| format!("Failed to open {}", config.data_file.display()))?;
    let command = to_command(command, &manager)?;
    debug!(?command, "Executing command");

    let result = command.execute(&mut manager)?;
    println!("{}", result.feedback);
    for line in &result.lines {
        println!("{}", line);
    }

    if result.modified {
        manager.save()?;
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::resolve(cli.data_file, cli.log_file, cli.quiet);

    init_logging(config.quiet, config.log_file.as_deref())
        .map_err(|err| anyhow!("Failed to initialize logging: {}", err))?;

    run(cli.command, &config)
}
