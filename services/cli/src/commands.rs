//! Slash commands understood by the terminal front end.

use alma_core::{Input, InteractionMode, view::Action};

/// One parsed line of user input.
#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    /// Something for the controller.
    Input(Input),
    Help,
    Exit,
    Unknown(String),
}

/// Parses a line. Blank lines yield `None`; anything not starting with `/`
/// is free text.
pub fn parse_line(line: &str) -> Option<Command> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let Some(rest) = line.strip_prefix('/') else {
        return Some(Command::Input(Input::message(line)));
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };
    let command = match name.to_lowercase().as_str() {
        "ganti-topik" => Command::Input(Input::ChangeTopic),
        "selesai" => Command::Input(Input::FinishSimulation),
        "simulasi-baru" => Command::Input(Input::StartNewSimulation),
        "sesi-baru" => Command::Input(Input::NewSession),
        "mode" => match arg.parse::<InteractionMode>() {
            Ok(mode) => Command::Input(Input::SwitchMode { mode }),
            Err(_) => Command::Unknown(line.to_string()),
        },
        "bantuan" | "help" => Command::Help,
        "keluar" | "exit" | "quit" => Command::Exit,
        _ => Command::Unknown(line.to_string()),
    };
    Some(command)
}

/// The slash command offering an action, if it has one.
pub fn command_for(action: Action) -> Option<&'static str> {
    match action {
        Action::FreeText => None,
        Action::ChangeTopic => Some("/ganti-topik"),
        Action::FinishSimulation => Some("/selesai"),
        Action::StartNewSimulation => Some("/simulasi-baru"),
        Action::NewSession => Some("/sesi-baru"),
    }
}

pub const HELP: &str = "\
Perintah:
  /ganti-topik     batalkan kuis dan pilih topik baru
  /selesai         akhiri simulasi dan minta evaluasi
  /simulasi-baru   mulai simulasi baru setelah evaluasi atau skenario gagal
  /sesi-baru       keluar dari sesi dan login ulang
  /mode <mode>     pindah ke Tanya-Jawab, Kuis Interaktif, atau Simulasi
  /keluar          tutup aplikasi";
