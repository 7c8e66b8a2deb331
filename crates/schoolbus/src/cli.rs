//! Clap derive structures for the `schoolbus` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::num::NonZeroUsize;
use std::path::PathBuf;

use chrono::{NaiveDate, NaiveTime};
use clap::{Args, Parser, Subcommand, ValueEnum};

use schoolbus_core::{TripDirection, TripStatus};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// schoolbus -- administer school-bus fleets, families and routes
#[derive(Debug, Parser)]
#[command(
    name = "schoolbus",
    version,
    about = "Administer school-bus transportation from the command line",
    long_about = "Manage establishments, buses, drivers, parents, students, routes and\n\
        daily trips, against a local JSON dataset or a remote REST backend.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Configuration profile to use
    #[arg(long, short = 'p', env = "SCHOOLBUS_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Remote backend URL (overrides profile; implies the remote backend)
    #[arg(
        long,
        env = "SCHOOLBUS_API_URL",
        global = true,
        conflicts_with = "data"
    )]
    pub api_url: Option<String>,

    /// Backend bearer token
    #[arg(long, env = "SCHOOLBUS_API_TOKEN", global = true, hide_env_values = true)]
    pub api_token: Option<String>,

    /// Local dataset file (overrides profile; implies the local backend)
    #[arg(long, env = "SCHOOLBUS_DATA", global = true)]
    pub data: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "SCHOOLBUS_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "SCHOOLBUS_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "SCHOOLBUS_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Rows per page (overrides profile)
    #[arg(long, env = "SCHOOLBUS_PER_PAGE", global = true)]
    pub per_page: Option<NonZeroUsize>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one id per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage establishments (schools)
    #[command(alias = "est", alias = "schools")]
    Establishments(EstablishmentsArgs),

    /// Manage the bus fleet
    #[command(alias = "bus", alias = "b")]
    Buses(BusesArgs),

    /// Manage drivers
    #[command(alias = "drv")]
    Drivers(DriversArgs),

    /// Manage parents and their linked students
    Parents(ParentsArgs),

    /// Manage students
    #[command(alias = "st")]
    Students(StudentsArgs),

    /// Manage routes
    #[command(alias = "rt")]
    Routes(RoutesArgs),

    /// Manage daily trips
    Trips(TripsArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Shared Arguments ─────────────────────────────────────────────────

/// Shared filtering and paging arguments for all list commands.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Only records belonging to this establishment
    #[arg(long, short = 'e', value_name = "ID")]
    pub establishment: Option<u64>,

    /// Case-insensitive text search across the visible columns
    #[arg(long, short = 's', value_name = "QUERY")]
    pub search: Option<String>,

    /// Page to show (out-of-range pages snap to the last page)
    #[arg(long, default_value = "1")]
    pub page: usize,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  ESTABLISHMENTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct EstablishmentsArgs {
    #[command(subcommand)]
    pub command: EstablishmentsCommand,
}

#[derive(Debug, Subcommand)]
pub enum EstablishmentsCommand {
    /// List establishments
    #[command(alias = "ls")]
    List(ListArgs),

    /// Show one establishment
    Get {
        /// Establishment ID
        id: u64,
    },

    /// Create an establishment
    Create {
        /// Read the full JSON payload from a file
        #[arg(long, short = 'F', conflicts_with_all = ["name", "address", "city", "phone"])]
        from_file: Option<PathBuf>,

        /// Establishment name
        #[arg(long, required_unless_present = "from_file")]
        name: Option<String>,

        /// Street address
        #[arg(long, required_unless_present = "from_file")]
        address: Option<String>,

        /// City
        #[arg(long, required_unless_present = "from_file")]
        city: Option<String>,

        /// Contact phone
        #[arg(long)]
        phone: Option<String>,
    },

    /// Update an establishment
    Update {
        /// Establishment ID
        id: u64,

        /// Read the JSON patch from a file
        #[arg(long, short = 'F', conflicts_with_all = ["name", "address", "city", "phone"])]
        from_file: Option<PathBuf>,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        address: Option<String>,

        #[arg(long)]
        city: Option<String>,

        #[arg(long)]
        phone: Option<String>,
    },

    /// Delete an establishment (permanent; buses and students are detached)
    #[command(alias = "rm")]
    Delete {
        /// Establishment ID
        id: u64,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  BUSES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct BusesArgs {
    #[command(subcommand)]
    pub command: BusesCommand,
}

#[derive(Debug, Subcommand)]
pub enum BusesCommand {
    /// List buses
    #[command(alias = "ls")]
    List(ListArgs),

    /// Show one bus
    Get {
        /// Bus ID
        id: u64,
    },

    /// Register a bus
    Create {
        /// Read the full JSON payload from a file
        #[arg(
            long,
            short = 'F',
            conflicts_with_all = ["plate", "make", "model", "capacity", "establishment", "driver"]
        )]
        from_file: Option<PathBuf>,

        /// Plate number
        #[arg(long, required_unless_present = "from_file")]
        plate: Option<String>,

        /// Manufacturer
        #[arg(long, required_unless_present = "from_file")]
        make: Option<String>,

        /// Model name
        #[arg(long)]
        model: Option<String>,

        /// Seats
        #[arg(long, required_unless_present = "from_file")]
        capacity: Option<u32>,

        /// Owning establishment ID
        #[arg(long, short = 'e')]
        establishment: Option<u64>,

        /// Assigned driver ID
        #[arg(long)]
        driver: Option<u64>,
    },

    /// Update a bus
    Update {
        /// Bus ID
        id: u64,

        /// Read the JSON patch from a file
        #[arg(
            long,
            short = 'F',
            conflicts_with_all = ["plate", "make", "model", "capacity", "establishment", "driver"]
        )]
        from_file: Option<PathBuf>,

        #[arg(long)]
        plate: Option<String>,

        #[arg(long)]
        make: Option<String>,

        #[arg(long)]
        model: Option<String>,

        #[arg(long)]
        capacity: Option<u32>,

        #[arg(long, short = 'e')]
        establishment: Option<u64>,

        #[arg(long)]
        driver: Option<u64>,
    },

    /// Delete a bus (permanent; its trips lose their bus)
    #[command(alias = "rm")]
    Delete {
        /// Bus ID
        id: u64,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  DRIVERS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct DriversArgs {
    #[command(subcommand)]
    pub command: DriversCommand,
}

#[derive(Debug, Subcommand)]
pub enum DriversCommand {
    /// List drivers
    #[command(alias = "ls")]
    List(ListArgs),

    /// Show one driver
    Get {
        /// Driver ID
        id: u64,
    },

    /// Hire a driver
    Create {
        /// Read the full JSON payload from a file
        #[arg(
            long,
            short = 'F',
            conflicts_with_all = ["first_name", "last_name", "email", "phone", "license", "establishment"]
        )]
        from_file: Option<PathBuf>,

        #[arg(long, required_unless_present = "from_file")]
        first_name: Option<String>,

        #[arg(long, required_unless_present = "from_file")]
        last_name: Option<String>,

        #[arg(long, required_unless_present = "from_file")]
        email: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        /// Driving licence number
        #[arg(long)]
        license: Option<String>,

        #[arg(long, short = 'e')]
        establishment: Option<u64>,
    },

    /// Update a driver
    Update {
        /// Driver ID
        id: u64,

        /// Read the JSON patch from a file
        #[arg(
            long,
            short = 'F',
            conflicts_with_all = ["first_name", "last_name", "email", "phone", "license", "establishment"]
        )]
        from_file: Option<PathBuf>,

        #[arg(long)]
        first_name: Option<String>,

        #[arg(long)]
        last_name: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        #[arg(long)]
        license: Option<String>,

        #[arg(long, short = 'e')]
        establishment: Option<u64>,
    },

    /// Archive a driver
    #[command(alias = "rm")]
    Delete {
        /// Driver ID
        id: u64,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  PARENTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ParentsArgs {
    #[command(subcommand)]
    pub command: ParentsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ParentsCommand {
    /// List parents
    #[command(alias = "ls")]
    List(ListArgs),

    /// Show one parent
    Get {
        /// Parent ID
        id: u64,
    },

    /// Register a parent and link their students
    Create {
        /// Read the full JSON payload from a file
        #[arg(
            long,
            short = 'F',
            conflicts_with_all = ["first_name", "last_name", "email", "phone", "students"]
        )]
        from_file: Option<PathBuf>,

        #[arg(long, required_unless_present = "from_file")]
        first_name: Option<String>,

        #[arg(long, required_unless_present = "from_file")]
        last_name: Option<String>,

        #[arg(long, required_unless_present = "from_file")]
        email: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        /// Linked student IDs (comma-separated)
        #[arg(long, value_delimiter = ',')]
        students: Vec<u64>,
    },

    /// Update a parent
    Update {
        /// Parent ID
        id: u64,

        /// Read the JSON patch from a file
        #[arg(
            long,
            short = 'F',
            conflicts_with_all = ["first_name", "last_name", "email", "phone", "students"]
        )]
        from_file: Option<PathBuf>,

        #[arg(long)]
        first_name: Option<String>,

        #[arg(long)]
        last_name: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        /// Replace the linked students (comma-separated)
        #[arg(long, value_delimiter = ',')]
        students: Option<Vec<u64>>,
    },

    /// Archive a parent (their student links are removed)
    #[command(alias = "rm")]
    Delete {
        /// Parent ID
        id: u64,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  STUDENTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct StudentsArgs {
    #[command(subcommand)]
    pub command: StudentsCommand,
}

#[derive(Debug, Subcommand)]
pub enum StudentsCommand {
    /// List students
    #[command(alias = "ls")]
    List(ListArgs),

    /// Show one student
    Get {
        /// Student ID
        id: u64,
    },

    /// Enrol a student
    Create {
        /// Read the full JSON payload from a file
        #[arg(
            long,
            short = 'F',
            conflicts_with_all = ["first_name", "last_name", "grade", "establishment", "route"]
        )]
        from_file: Option<PathBuf>,

        #[arg(long, required_unless_present = "from_file")]
        first_name: Option<String>,

        #[arg(long, required_unless_present = "from_file")]
        last_name: Option<String>,

        /// School grade (e.g. "CM2")
        #[arg(long)]
        grade: Option<String>,

        #[arg(long, short = 'e')]
        establishment: Option<u64>,

        /// Assigned route ID
        #[arg(long)]
        route: Option<u64>,
    },

    /// Update a student
    Update {
        /// Student ID
        id: u64,

        /// Read the JSON patch from a file
        #[arg(
            long,
            short = 'F',
            conflicts_with_all = ["first_name", "last_name", "grade", "establishment", "route"]
        )]
        from_file: Option<PathBuf>,

        #[arg(long)]
        first_name: Option<String>,

        #[arg(long)]
        last_name: Option<String>,

        #[arg(long)]
        grade: Option<String>,

        #[arg(long, short = 'e')]
        establishment: Option<u64>,

        #[arg(long)]
        route: Option<u64>,
    },

    /// Archive a student (their parent links are removed)
    #[command(alias = "rm")]
    Delete {
        /// Student ID
        id: u64,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  ROUTES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct RoutesArgs {
    #[command(subcommand)]
    pub command: RoutesCommand,
}

#[derive(Debug, Subcommand)]
pub enum RoutesCommand {
    /// List routes
    #[command(alias = "ls")]
    List(ListArgs),

    /// Show one route
    Get {
        /// Route ID
        id: u64,
    },

    /// Create a route
    Create {
        /// Read the full JSON payload from a file
        #[arg(long, short = 'F', conflicts_with_all = ["name", "establishment", "stops"])]
        from_file: Option<PathBuf>,

        #[arg(long, required_unless_present = "from_file")]
        name: Option<String>,

        #[arg(long, short = 'e')]
        establishment: Option<u64>,

        /// Ordered stop names (comma-separated)
        #[arg(long, value_delimiter = ',')]
        stops: Vec<String>,
    },

    /// Update a route
    Update {
        /// Route ID
        id: u64,

        /// Read the JSON patch from a file
        #[arg(long, short = 'F', conflicts_with_all = ["name", "establishment", "stops"])]
        from_file: Option<PathBuf>,

        #[arg(long)]
        name: Option<String>,

        #[arg(long, short = 'e')]
        establishment: Option<u64>,

        /// Replace the stop list (comma-separated)
        #[arg(long, value_delimiter = ',')]
        stops: Option<Vec<String>>,
    },

    /// Delete a route (permanent; students and trips are detached)
    #[command(alias = "rm")]
    Delete {
        /// Route ID
        id: u64,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  TRIPS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct TripsArgs {
    #[command(subcommand)]
    pub command: TripsCommand,
}

#[derive(Debug, Subcommand)]
pub enum TripsCommand {
    /// List trips
    #[command(alias = "ls")]
    List(ListArgs),

    /// Show one trip
    Get {
        /// Trip ID
        id: u64,
    },

    /// Schedule a trip
    Create {
        /// Read the full JSON payload from a file
        #[arg(
            long,
            short = 'F',
            conflicts_with_all = ["route", "bus", "driver", "date", "departure", "direction", "status"]
        )]
        from_file: Option<PathBuf>,

        /// Route ID
        #[arg(long, required_unless_present = "from_file")]
        route: Option<u64>,

        /// Bus ID
        #[arg(long)]
        bus: Option<u64>,

        /// Driver ID
        #[arg(long)]
        driver: Option<u64>,

        /// Service day (YYYY-MM-DD)
        #[arg(long, required_unless_present = "from_file")]
        date: Option<NaiveDate>,

        /// Departure time (HH:MM)
        #[arg(long, required_unless_present = "from_file")]
        departure: Option<NaiveTime>,

        #[arg(long, value_enum)]
        direction: Option<DirectionArg>,

        #[arg(long, value_enum)]
        status: Option<StatusArg>,
    },

    /// Update a trip
    Update {
        /// Trip ID
        id: u64,

        /// Read the JSON patch from a file
        #[arg(
            long,
            short = 'F',
            conflicts_with_all = ["route", "bus", "driver", "date", "departure", "direction", "status"]
        )]
        from_file: Option<PathBuf>,

        #[arg(long)]
        route: Option<u64>,

        #[arg(long)]
        bus: Option<u64>,

        #[arg(long)]
        driver: Option<u64>,

        #[arg(long)]
        date: Option<NaiveDate>,

        #[arg(long)]
        departure: Option<NaiveTime>,

        #[arg(long, value_enum)]
        direction: Option<DirectionArg>,

        #[arg(long, value_enum)]
        status: Option<StatusArg>,
    },

    /// Delete a trip
    #[command(alias = "rm")]
    Delete {
        /// Trip ID
        id: u64,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DirectionArg {
    /// Home to school
    Pickup,
    /// School to home
    Dropoff,
}

impl From<DirectionArg> for TripDirection {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::Pickup => Self::Pickup,
            DirectionArg::Dropoff => Self::Dropoff,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StatusArg {
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

impl From<StatusArg> for TripStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Scheduled => Self::Scheduled,
            StatusArg::InProgress => Self::InProgress,
            StatusArg::Completed => Self::Completed,
            StatusArg::Cancelled => Self::Cancelled,
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create a profile with guided setup
    Init,

    /// Display the current configuration (secrets masked)
    Show,

    /// Print the config file location
    Path,

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
