//-
// Copyright (c) 2024, Jason Lingle
//
// This file is part of Fidotoss.
//
// Fidotoss is free software: you can  redistribute it and/or modify it under
// the terms of the GNU General Public  License as published by the Free
// Software Foundation, either version  3 of the License, or (at  your option)
// any later version.
//
// Fidotoss is distributed  in the hope that  it will be useful,  but WITHOUT
// ANY WARRANTY; without  even the implied  warranty of MERCHANTABILITY  or
// FITNESS FOR  A PARTICULAR  PURPOSE.  See the  GNU General  Public  License
// for more details.
//
// You should have received a copy of the GNU General Public License along with
// Fidotoss. If not, see <http://www.gnu.org/licenses/>.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use structopt::StructOpt;

use crate::support::sysexits::*;
use crate::support::system_config::SystemConfig;

#[derive(StructOpt)]
#[structopt(max_term_width = 80)]
enum Command {
    /// Toss every bundle waiting in the inbound directory.
    ///
    /// Each bundle is extracted into the unpack directory, every packet
    /// within is decoded, and the messages are written into the spool
    /// directory under `<network>/<area>/`. Messages without an area
    /// (netmail) go into `<network>/netmail/`. The per-area message pointers
    /// in the index file are advanced to account for the new messages.
    ///
    /// Bundles are left in the inbound directory afterwards.
    ///
    /// A summary of messages per area is printed at the end. Problems with
    /// individual bundles, packets, or messages do not stop the run; they
    /// are logged and listed after the summary, and cause the exit status to
    /// be EX_DATAERR.
    Toss(CommonOptions),
    Inspect(InspectSubcommand),
}

#[derive(StructOpt, Default)]
pub(super) struct CommonOptions {
    /// The directory containing `fidotoss.toml` etc
    /// [default: /etc/fidotoss or /usr/local/etc/fidotoss]
    #[structopt(long, parse(from_os_str))]
    root: Option<PathBuf>,
}

/// Decode packet files and print their contents.
///
/// No configuration is needed, and nothing is routed or written. This is
/// useful for looking at packets that failed to toss.
#[derive(StructOpt)]
pub(super) struct InspectSubcommand {
    /// Print the kludge lines of each message.
    #[structopt(long, short)]
    pub(super) kludges: bool,

    /// Print each message body in packed form (CR line endings, kludges
    /// inline) instead of just the text.
    #[structopt(long)]
    pub(super) raw: bool,

    /// Character set to assume for messages without a CHRS kludge.
    #[structopt(long, default_value = "CP437")]
    pub(super) charset: String,

    /// The packet files to decode.
    #[structopt(parse(from_os_str), required = true)]
    pub(super) packets: Vec<PathBuf>,
}

pub fn main() {
    // Clap exits with status 1 instead of EX_USAGE if we use the more concise
    // API
    let cmd = Command::from_clap(&match Command::clap().get_matches_safe() {
        Ok(matches) => matches,
        Err(
            e @ clap::Error {
                kind: clap::ErrorKind::HelpDisplayed,
                ..
            },
        )
        | Err(
            e @ clap::Error {
                kind: clap::ErrorKind::VersionDisplayed,
                ..
            },
        ) => {
            println!("{}", e.message);
            return;
        },
        Err(e) => {
            eprintln!("{}", e.message);
            EX_USAGE.exit()
        },
    });

    match cmd {
        Command::Toss(common) => toss(common),
        Command::Inspect(cmd) => {
            crate::init_simple_log();
            super::inspect::inspect(cmd);
        },
    }
}

fn toss(common: CommonOptions) {
    let root = common.root.unwrap_or_else(|| {
        if Path::new("/etc/fidotoss/fidotoss.toml").is_file() {
            "/etc/fidotoss".to_owned().into()
        } else if Path::new("/usr/local/etc/fidotoss/fidotoss.toml").is_file()
        {
            "/usr/local/etc/fidotoss".to_owned().into()
        } else {
            eprintln!(
                "Neither /etc/fidotoss nor /usr/local/etc/fidotoss looks like\n\
                 the Fidotoss root; use --root=/path/to/fidotoss if your\n\
                 installation is elsewhere."
            );
            EX_CONFIG.exit()
        }
    });

    let system_config_path = root.join("fidotoss.toml");
    let mut system_config_toml = Vec::new();
    if let Err(e) = fs::File::open(&system_config_path)
        .and_then(|mut f| f.read_to_end(&mut system_config_toml))
    {
        die!(
            EX_CONFIG,
            "Error reading '{}': {}",
            system_config_path.display(),
            e
        );
    }

    let mut system_config: SystemConfig =
        match toml::from_slice(&system_config_toml) {
            Ok(config) => config,
            Err(e) => die!(
                EX_CONFIG,
                "Error in config file at '{}': {}",
                system_config_path.display(),
                e
            ),
        };
    system_config.paths.resolve_against(&root);

    if system_config.networks.is_empty() {
        die!(
            EX_CONFIG,
            "'{}' does not define any [[network]]",
            system_config_path.display()
        );
    }

    if !system_config.paths.inbound.is_dir() {
        die!(
            EX_NOINPUT,
            "Inbound directory '{}' seems to be missing",
            system_config.paths.inbound.display()
        );
    }

    init_log(&root);

    super::toss::toss(&system_config);
}

fn init_log(root: &Path) {
    if Ok(true) == nix::unistd::isatty(2) {
        // Running interactively; ignore logging configuration and just write
        // to stderr.
        crate::init_simple_log();
    } else {
        // Most likely running from cron or a mailer's post-session hook.
        // log4rs can be configured in detail, but if there is no config for
        // it, syslog is the next best thing.
        let log_config_file = root.join("logging.toml");
        if log_config_file.is_file() {
            if let Err(e) = log4rs::init_file(
                log_config_file,
                log4rs::file::Deserializers::new(),
            ) {
                die!(EX_CONFIG, "Failed to initialise logging: {}", e);
            }
        } else {
            let formatter = syslog::Formatter3164 {
                facility: syslog::Facility::LOG_MAIL,
                hostname: None,
                process: env!("CARGO_PKG_NAME").to_owned(),
                pid: nix::unistd::getpid().as_raw(),
            };

            let logger = match syslog::unix(formatter) {
                Ok(logger) => logger,
                Err(e) => die!(EX_OSERR, "Failed to connect to syslog: {}", e),
            };
            if let Err(e) = log::set_boxed_logger(Box::new(
                syslog::BasicLogger::new(logger),
            ))
            .map(|_| log::set_max_level(log::LevelFilter::Info))
            {
                die!(EX_SOFTWARE, "Failed to initialise logging: {}", e);
            }
        }
    }
}
