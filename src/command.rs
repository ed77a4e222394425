//! One-line text commands for the interactive front end.

use std::io::Write;

use ulid::Ulid;

use crate::clock::{self, ClockError};
use crate::engine::{BookingError, BookingRegistry, DeviceCommandOutcome};
use crate::model::*;

/// Which reservation a command addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Id(ReservationId),
    /// Case-insensitive match on an active reservation's label.
    Label(String),
}

/// Parsed command from a line of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    AddResource {
        name: String,
        kind: ResourceKind,
        capacity: u32,
    },
    Book {
        resource: String,
        interval: Interval,
        attendees: u32,
        label: String,
    },
    /// Task-organizer form: explicit end time and priority, one participant.
    Task {
        resource: String,
        interval: Interval,
        priority: Priority,
        label: String,
    },
    Cancel {
        resource: String,
        target: Target,
    },
    Complete {
        resource: String,
        target: Target,
    },
    Reschedule {
        resource: String,
        interval: Interval,
        target: Target,
    },
    Status {
        resource: String,
    },
    ListAll,
    ListPriority {
        priority: Priority,
    },
    Devices {
        resource: String,
        codes: String,
    },
    Power {
        resource: String,
        on: bool,
    },
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    Empty,
    Unknown(String),
    WrongArity(&'static str, usize, usize),
    BadNumber(String),
    BadKind(String),
    BadPower(String),
    Clock(ClockError),
    Priority(UnknownPriority),
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandError::Empty => f.write_str("empty command"),
            CommandError::Unknown(cmd) => write!(f, "unknown command: {cmd} (try `help`)"),
            CommandError::WrongArity(cmd, expected, got) => {
                write!(f, "{cmd}: expected at least {expected} arguments, got {got}")
            }
            CommandError::BadNumber(s) => write!(f, "not a non-negative number: {s}"),
            CommandError::BadKind(s) => {
                write!(f, "unknown resource kind {s:?} (conference, meeting or generic)")
            }
            CommandError::BadPower(s) => write!(f, "expected on or off, got {s:?}"),
            CommandError::Clock(e) => write!(f, "{e}"),
            CommandError::Priority(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for CommandError {}

impl From<ClockError> for CommandError {
    fn from(e: ClockError) -> Self {
        CommandError::Clock(e)
    }
}

impl From<UnknownPriority> for CommandError {
    fn from(e: UnknownPriority) -> Self {
        CommandError::Priority(e)
    }
}

pub const HELP: &str = "\
commands:
  add <name> <conference|meeting|generic> <capacity>
  book <room> <HH:MM> <minutes> <attendees> <label...>
  task <slot> <HH:MM> <HH:MM> <high|medium|low> <label...>
  cancel <resource> <id|label...>
  complete <resource> <id|label...>
  move <resource> <HH:MM> <HH:MM> <id|label...>   (alias: reschedule)
  status <resource>
  list
  priority <high|medium|low>
  devices <room> <codes>      (L lights, A air conditioner, P projector)
  power <room> <on|off>
  help
  quit";

pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let words: Vec<&str> = line.split_whitespace().collect();
    let Some((&verb, args)) = words.split_first() else {
        return Err(CommandError::Empty);
    };

    match verb.to_ascii_lowercase().as_str() {
        "add" => {
            arity("add", args, 3)?;
            Ok(Command::AddResource {
                name: args[0].to_string(),
                kind: parse_kind(args[1])?,
                capacity: parse_u32(args[2])?,
            })
        }
        "book" => {
            arity("book", args, 5)?;
            Ok(Command::Book {
                resource: args[0].to_string(),
                interval: clock::interval_from_hhmm(args[1], parse_u32(args[2])?)?,
                attendees: parse_u32(args[3])?,
                label: args[4..].join(" "),
            })
        }
        "task" => {
            arity("task", args, 5)?;
            Ok(Command::Task {
                resource: args[0].to_string(),
                interval: clock::interval_between(args[1], args[2])?,
                priority: args[3].parse()?,
                label: args[4..].join(" "),
            })
        }
        "cancel" => {
            arity("cancel", args, 2)?;
            Ok(Command::Cancel {
                resource: args[0].to_string(),
                target: parse_target(&args[1..]),
            })
        }
        "complete" => {
            arity("complete", args, 2)?;
            Ok(Command::Complete {
                resource: args[0].to_string(),
                target: parse_target(&args[1..]),
            })
        }
        "move" | "reschedule" => {
            arity("move", args, 4)?;
            Ok(Command::Reschedule {
                resource: args[0].to_string(),
                interval: clock::interval_between(args[1], args[2])?,
                target: parse_target(&args[3..]),
            })
        }
        "status" => {
            arity("status", args, 1)?;
            Ok(Command::Status {
                resource: args[0].to_string(),
            })
        }
        "list" => Ok(Command::ListAll),
        "priority" => {
            arity("priority", args, 1)?;
            Ok(Command::ListPriority {
                priority: args[0].parse()?,
            })
        }
        "devices" => {
            arity("devices", args, 2)?;
            Ok(Command::Devices {
                resource: args[0].to_string(),
                codes: args[1..].concat(),
            })
        }
        "power" => {
            arity("power", args, 2)?;
            let on = match args[1].to_ascii_lowercase().as_str() {
                "on" => true,
                "off" => false,
                _ => return Err(CommandError::BadPower(args[1].to_string())),
            };
            Ok(Command::Power {
                resource: args[0].to_string(),
                on,
            })
        }
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}

fn arity(cmd: &'static str, args: &[&str], expected: usize) -> Result<(), CommandError> {
    if args.len() < expected {
        return Err(CommandError::WrongArity(cmd, expected, args.len()));
    }
    Ok(())
}

fn parse_u32(s: &str) -> Result<u32, CommandError> {
    s.parse().map_err(|_| CommandError::BadNumber(s.to_string()))
}

fn parse_kind(s: &str) -> Result<ResourceKind, CommandError> {
    match s.to_ascii_lowercase().as_str() {
        "conference" => Ok(ResourceKind::Room { layout: RoomLayout::Conference }),
        "meeting" => Ok(ResourceKind::Room { layout: RoomLayout::Meeting }),
        "generic" | "slot" => Ok(ResourceKind::Generic),
        _ => Err(CommandError::BadKind(s.to_string())),
    }
}

fn parse_target(words: &[&str]) -> Target {
    if let [single] = words
        && let Ok(id) = Ulid::from_string(single)
    {
        return Target::Id(id);
    }
    Target::Label(words.join(" "))
}

// ── Execution ────────────────────────────────────────────────────

/// Cancelled bookings are dropped from listings; completed ones stay, tagged.
fn listed(r: &Reservation) -> bool {
    r.status != ReservationStatus::Cancelled
}

fn status_tag(r: &Reservation) -> String {
    if r.is_active() { String::new() } else { format!(" [{}]", r.status) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

fn resolve_target(registry: &BookingRegistry, resource: &str, target: Target) -> Result<ReservationId, Box<dyn std::error::Error>> {
    match target {
        Target::Id(id) => Ok(id),
        Target::Label(label) => registry
            .find_active_by_label(resource, &label)?
            .map(|r| r.id)
            .ok_or_else(|| format!("no active reservation labelled {label:?} on {resource}").into()),
    }
}

/// Run one command against the registry, writing human-readable output.
/// Booking failures come back as `Err` for the caller to render.
pub fn execute(
    registry: &BookingRegistry,
    command: Command,
    out: &mut impl Write,
) -> Result<Flow, Box<dyn std::error::Error>> {
    match command {
        Command::AddResource { name, kind, capacity } => {
            registry.add_resource(&name, capacity, kind)?;
            writeln!(out, "added {kind} {name} (capacity {capacity})")?;
        }
        Command::Book { resource, interval, attendees, label } => {
            let id = registry.book(&resource, interval, label, attendees)?;
            writeln!(out, "booked {resource} {interval}: {id}")?;
        }
        Command::Task { resource, interval, priority, label } => {
            let request = BookingRequest::new(interval, label, 1).with_priority(priority);
            let id = registry.book_request(&resource, request)?;
            writeln!(out, "scheduled {resource} {interval} [{priority}]: {id}")?;
        }
        Command::Cancel { resource, target } => {
            let id = resolve_target(registry, &resource, target)?;
            registry.cancel(&resource, id)?;
            writeln!(out, "cancelled {id}")?;
        }
        Command::Complete { resource, target } => {
            let id = resolve_target(registry, &resource, target)?;
            registry.complete(&resource, id)?;
            writeln!(out, "completed {id}")?;
        }
        Command::Reschedule { resource, interval, target } => {
            let id = resolve_target(registry, &resource, target)?;
            registry.reschedule(&resource, id, interval)?;
            writeln!(out, "moved {id} to {interval}")?;
        }
        Command::Status { resource } => {
            let snapshot = registry.resource_status(&resource)?;
            writeln!(out, "{}", serde_json::to_string_pretty(&snapshot)?)?;
        }
        Command::ListAll => {
            for (name, snapshot) in registry.list_all() {
                writeln!(out, "{name} ({}, capacity {}):", snapshot.kind, snapshot.capacity)?;
                let shown: Vec<Reservation> = registry.history(&name)?.into_iter().filter(listed).collect();
                if shown.is_empty() {
                    writeln!(out, "  no bookings")?;
                }
                for r in &shown {
                    writeln!(
                        out,
                        "  {} {} x{} [{}]{} {}",
                        r.interval,
                        r.label,
                        r.attendees,
                        r.priority,
                        status_tag(r),
                        r.id
                    )?;
                }
            }
        }
        Command::ListPriority { priority } => {
            for (name, r) in registry.history_by_priority(priority).into_iter().filter(|(_, r)| listed(r)) {
                writeln!(out, "{name} {} {}{}", r.interval, r.label, status_tag(&r))?;
            }
        }
        Command::Devices { resource, codes } => {
            for outcome in registry.execute_device_commands(&resource, &codes)? {
                match outcome {
                    DeviceCommandOutcome::Switched(device) => writeln!(out, "{device} turned ON")?,
                    DeviceCommandOutcome::Unknown(code) => writeln!(out, "unknown command: {code}")?,
                }
            }
        }
        Command::Power { resource, on } => {
            registry.set_devices_power(&resource, on)?;
            writeln!(out, "all devices in {resource} turned {}", if on { "ON" } else { "OFF" })?;
        }
        Command::Help => writeln!(out, "{HELP}")?,
        Command::Quit => return Ok(Flow::Quit),
    }
    Ok(Flow::Continue)
}

/// Downcast helper so callers can tell booking outcomes from I/O trouble.
pub fn booking_error<'a>(e: &'a (dyn std::error::Error + 'static)) -> Option<&'a BookingError> {
    e.downcast_ref::<BookingError>()
}
