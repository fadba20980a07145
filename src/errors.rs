//! Error types with rich diagnostics using miette
//!
//! Input errors carry source spans so a malformed scene document points at
//! the offending byte.

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::types::NumericError;

/// Source context for error reporting
#[derive(Debug, Clone)]
pub struct SourceContext {
    /// Name of the source (filename or "<input>")
    pub name: String,
    /// The full source text
    pub source: String,
}

impl SourceContext {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
        }
    }

    /// Create a NamedSource for miette
    pub fn named_source(&self) -> NamedSource<String> {
        NamedSource::new(&self.name, self.source.clone())
    }

    /// Byte offset of a 1-based line/column pair as reported by serde_json.
    pub fn offset_of(&self, line: usize, column: usize) -> usize {
        if line == 0 {
            return 0;
        }
        let line_start: usize = self
            .source
            .split_inclusive('\n')
            .take(line - 1)
            .map(str::len)
            .sum();
        (line_start + column.saturating_sub(1)).min(self.source.len())
    }

    /// Deserialize `T` from the held source, mapping serde failures to a
    /// labelled [`InputError::Json`].
    pub fn parse_json<T: serde::de::DeserializeOwned>(&self) -> Result<T, InputError> {
        serde_json::from_str(&self.source).map_err(|err| InputError::json(self, &err))
    }
}

// ============================================================================
// Input Errors
// ============================================================================

/// Errors that occur while reading scene, episode, run or config documents
#[derive(Error, Diagnostic, Debug)]
pub enum InputError {
    #[error("invalid document: {message}")]
    #[diagnostic(code(roomplot::input::json))]
    Json {
        message: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("here")]
        span: SourceSpan,
    },

    #[error("cannot read {path}")]
    #[diagnostic(code(roomplot::input::io))]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config value for `{field}`: {reason}")]
    #[diagnostic(
        code(roomplot::input::invalid_config),
        help("sizes must be finite and non-negative")
    )]
    InvalidConfig { field: String, reason: NumericError },

    #[error("invalid colour `{value}` for `{field}`")]
    #[diagnostic(code(roomplot::input::invalid_colour), help("colours are written `#RRGGBB` or `#RGB`"))]
    InvalidColor { field: String, value: String },

    #[error("episode {episode_id} not found in run document")]
    #[diagnostic(code(roomplot::input::missing_episode))]
    MissingEpisode { episode_id: String },

    #[error("unknown handle `{handle}`")]
    #[diagnostic(
        code(roomplot::input::unknown_handle),
        help("handles are resolved through the episode's *_to_handle / room_to_id maps")
    )]
    UnknownHandle { handle: String },
}

impl InputError {
    pub fn json(ctx: &SourceContext, err: &serde_json::Error) -> Self {
        let offset = ctx.offset_of(err.line(), err.column());
        InputError::Json {
            message: err.to_string(),
            src: ctx.named_source(),
            span: SourceSpan::from((offset, 0)),
        }
    }
}

// ============================================================================
// Scene Errors
// ============================================================================

/// Errors that occur while resolving propositions against a scene
#[derive(Error, Diagnostic, Debug)]
pub enum SceneError {
    #[error("unknown proposition: {name}")]
    #[diagnostic(
        code(roomplot::scene::unknown_proposition),
        help("supported: is_on_top, is_inside, is_in_room, is_on_floor, is_next_to")
    )]
    UnknownProposition { name: String },

    #[error("malformed `{name}` proposition: {message}")]
    #[diagnostic(code(roomplot::scene::malformed_proposition))]
    MalformedProposition { name: String, message: String },

    #[error("malformed `{kind}` constraint: {message}")]
    #[diagnostic(code(roomplot::scene::malformed_constraint))]
    MalformedConstraint { kind: String, message: String },

    #[error("no TerminalSatisfactionConstraint found")]
    #[diagnostic(
        code(roomplot::scene::missing_terminal_constraint),
        help("every proposition list needs at least a TerminalSatisfactionConstraint")
    )]
    MissingTerminalConstraint,

    #[error("terminal constraint covers {terminal} propositions, but {propositions} were given")]
    #[diagnostic(code(roomplot::scene::terminal_count_mismatch))]
    TerminalCountMismatch { propositions: usize, terminal: usize },

    #[error("temporal constraint contains a cycle")]
    #[diagnostic(code(roomplot::scene::cyclic_temporal_constraint))]
    CyclicTemporalConstraint,

    #[error("temporal constraint references proposition {index}, but only {count} exist")]
    #[diagnostic(code(roomplot::scene::proposition_index_out_of_range))]
    PropositionIndexOutOfRange { index: usize, count: usize },

    #[error("{kind} `{name}` is not in any room")]
    #[diagnostic(
        code(roomplot::scene::missing_entity),
        help("disable `scene.strict` to skip propositions about absent entities")
    )]
    MissingEntity { kind: &'static str, name: String },

    #[error("next-to relations around `{entity}` cannot be split into two columns")]
    #[diagnostic(code(roomplot::scene::non_bipartite_next_to))]
    NonBipartiteNextTo { entity: String },

    #[error("unknown room: {name}")]
    #[diagnostic(code(roomplot::scene::unknown_room))]
    UnknownRoom { name: String },

    #[error("scene has no rooms")]
    #[diagnostic(code(roomplot::scene::empty))]
    EmptyScene,
}

// ============================================================================
// Render Errors
// ============================================================================

/// Errors that occur while writing the drawing surface
#[derive(Error, Diagnostic, Debug)]
pub enum RenderError {
    #[error("invalid scale: {value}")]
    #[diagnostic(code(roomplot::render::invalid_scale))]
    InvalidScale { value: f64 },

    #[error("infinite, NaN or empty view bounds")]
    #[diagnostic(code(roomplot::render::invalid_bounds))]
    InvalidBounds,

    #[error("svg serialization failed: {message}")]
    #[diagnostic(code(roomplot::render::xml))]
    Xml { message: String },
}

impl From<std::io::Error> for RenderError {
    fn from(err: std::io::Error) -> Self {
        RenderError::Xml {
            message: err.to_string(),
        }
    }
}
