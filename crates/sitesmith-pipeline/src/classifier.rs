//! Website vs. application routing
//!
//! Plain substring matching over fixed word lists. The rules are a contract:
//! any mention of "website" keeps a request on the website path.

use crate::constants::classify;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Website,
    Application,
}

/// Decide whether a free-text description asks for a website or an application
pub fn classify(description: &str) -> Classification {
    let lower = description.to_lowercase();

    let wants_application = contains_app_keyword(&lower) || contains_action_phrase(&lower);
    if wants_application && !lower.contains(classify::WEBSITE_MARKER) {
        Classification::Application
    } else {
        Classification::Website
    }
}

fn contains_app_keyword(lower: &str) -> bool {
    classify::APPLICATION_KEYWORDS
        .iter()
        .any(|keyword| lower.contains(keyword))
}

/// An action verb whose text after its first occurrence names a target,
/// e.g. "build a physics model"
fn contains_action_phrase(lower: &str) -> bool {
    for action in classify::ACTION_WORDS {
        if let Some(index) = lower.find(action) {
            let after = &lower[index + action.len()..];
            if classify::ACTION_TARGETS
                .iter()
                .any(|target| after.contains(target))
            {
                return true;
            }
        }
    }
    false
}

/// What kind of application template to use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplicationFocus {
    Game,
    Simulation,
    Generic,
}

/// Secondary classification of an application request
///
/// Both flags can be set; the game block wins for instructions while the
/// simulation flag still raises the token ceiling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplicationProfile {
    pub is_game: bool,
    pub is_simulation: bool,
}

impl ApplicationProfile {
    pub fn detect(description: &str) -> Self {
        let lower = description.to_lowercase();
        Self {
            is_game: classify::GAME_KEYWORDS.iter().any(|k| lower.contains(k)),
            is_simulation: classify::SIMULATION_KEYWORDS
                .iter()
                .any(|k| lower.contains(k)),
        }
    }

    pub fn focus(&self) -> ApplicationFocus {
        if self.is_game {
            ApplicationFocus::Game
        } else if self.is_simulation {
            ApplicationFocus::Simulation
        } else {
            ApplicationFocus::Generic
        }
    }
}
