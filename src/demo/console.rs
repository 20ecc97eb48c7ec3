//! Line commands standing in for the touch UI

use std::str::FromStr;

use super::Screen;
use crate::error::CommandError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Print the home menu
    Menu,
    /// Navigate to a screen
    Open(Screen),
    /// Back to the menu
    Back,
    /// Press the Show/Hide button
    Toggle,
    /// Tap at screen coordinates
    Tap { x: f32, y: f32 },
    Status,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  menu              show the demo list
  open <1|2|name>   open a screen (1 = By Reality Composer, 2 = By Pure Code)
  back              return to the menu
  toggle            press the Show/Hide button
  tap <x> <y>       tap the screen at (x, y) points
  status            print the current screen state
  quit              exit";

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            return Err(CommandError::Unknown(String::new()));
        };

        match head.to_lowercase().as_str() {
            "menu" | "home" => Ok(Self::Menu),
            "open" => {
                let target = words.next().ok_or(CommandError::MissingArgument("open"))?;
                Ok(Self::Open(target.parse()?))
            }
            "back" => Ok(Self::Back),
            "toggle" | "show" | "hide" => Ok(Self::Toggle),
            "tap" => {
                let x = coordinate(words.next())?;
                let y = coordinate(words.next())?;
                Ok(Self::Tap { x, y })
            }
            "status" => Ok(Self::Status),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" | "q" => Ok(Self::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

fn coordinate(word: Option<&str>) -> Result<f32, CommandError> {
    let word = word.ok_or(CommandError::MissingArgument("tap"))?;
    word.parse::<f32>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| CommandError::InvalidArgument {
            command: "tap",
            value: word.to_string(),
        })
}
