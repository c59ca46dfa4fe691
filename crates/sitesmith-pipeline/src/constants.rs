//! Pipeline constants
//!
//! Single source of truth for keyword lists, sampling parameters and limits.
//! The word lists are matched literally; changing them changes routing.

/// Request classification
pub mod classify {
    /// Terms that mark a request as an interactive application
    pub const APPLICATION_KEYWORDS: &[&str] = &[
        // Games
        "game",
        "snake game",
        "tetris",
        "puzzle game",
        "chess",
        "tic tac toe",
        "memory game",
        "pong",
        // Physics simulations
        "simulation",
        "physics simulation",
        "solar system",
        "planetary model",
        "physics model",
        "particle simulation",
        "gravity simulation",
        "pendulum simulation",
        "wave simulation",
        // Interactive models
        "interactive model",
        "3d model",
        "interactive visualization",
        "interactive demo",
        // Other interactive applications
        "calculator",
        "drawing app",
        "paint app",
        "clock",
        "timer",
        "stopwatch",
        "todo app",
        "weather app",
        "music player",
        "drum machine",
        "synthesizer",
        "piano",
    ];

    /// Verbs that, followed by an [`ACTION_TARGETS`] term, signal an application
    pub const ACTION_WORDS: &[&str] = &[
        "create",
        "make",
        "build",
        "develop",
        "simulate",
        "model",
        "interactive",
    ];

    pub const ACTION_TARGETS: &[&str] = &[
        "simulation",
        "model",
        "system",
        "visualization",
        "interactive",
    ];

    /// Any description mentioning this stays a website
    pub const WEBSITE_MARKER: &str = "website";

    pub const GAME_KEYWORDS: &[&str] = &["game", "tetris", "chess", "tic tac toe", "pong"];

    pub const SIMULATION_KEYWORDS: &[&str] = &["simulation", "solar system", "physics", "model"];
}

/// Topic extraction
pub mod topics {
    pub const TEMPERATURE: f32 = 0.2;
    pub const MAX_OUTPUT_TOKENS: u32 = 100;
    /// Fallback keywords must be strictly longer than this many characters
    pub const MIN_KEYWORD_CHARS: usize = 4;
    /// Pool used when extraction yields too few topics
    pub const GENERIC_TOPICS: &[&str] = &["business", "nature", "technology", "people", "food"];
}

/// Photo search
pub mod images {
    pub const PROVIDER_NAME: &str = "Unsplash";
    pub const BASE_URL: &str = "https://api.unsplash.com";
    pub const SEARCH_PATH: &str = "/search/photos";
    /// Words dropped from multi-word queries
    pub const STOP_WORDS: &[&str] = &[
        "the", "and", "or", "a", "an", "in", "on", "at", "by", "for", "with", "about", "website",
        "page",
    ];
    /// Queries with more words than this get stop-word filtering
    pub const PHRASE_WORD_THRESHOLD: usize = 2;
    pub const MAX_QUERY_WORDS: usize = 3;
    /// Results requested per wanted image, for local re-ranking
    pub const OVERFETCH_FACTOR: usize = 3;
    pub const MIN_RESULTS: usize = 10;
    /// Provider cap on per_page
    pub const MAX_RESULTS: usize = 30;
    pub const ORIENTATION: &str = "landscape";
    pub const CONTENT_FILTER: &str = "high";
    /// Images requested per topic when enriching a prompt
    pub const PER_TOPIC: usize = 1;
}

/// Final generation call
pub mod generation {
    pub const TEMPERATURE: f32 = 0.7;
    pub const TOP_P: f32 = 0.8;
    pub const TOP_K: u32 = 40;
    pub const WEBSITE_MAX_TOKENS: u32 = 2048;
    pub const APPLICATION_MAX_TOKENS: u32 = 4096;
    pub const SIMULATION_MAX_TOKENS: u32 = 6144;
}

/// Input limits
pub mod limits {
    pub const MAX_DESCRIPTION_CHARS: usize = 8000;
}
