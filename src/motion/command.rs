//! Host-facing commands.
//!
//! A viewer maps its key and timer events onto [`Command`]s and feeds them
//! to [`AffineMotion::handle_command`](super::AffineMotion::handle_command),
//! so the engine never depends on a windowing toolkit.

/// A discrete event from the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Move the animation forward by one step.
    Advance,
    /// Restart the animation at its first step.
    Reset,
    /// Show or hide the wireframe.
    ToggleWires,
    /// Show or hide the shaded surface.
    ToggleSurface,
    /// Turn lighting on or off.
    ToggleLights,
    /// Show or hide element ids.
    ToggleIds,
    /// The host is about to draw.
    Redraw,
}

impl Command {
    /// Default key binding, matching the classic viewer keys.
    pub fn from_key(key: char) -> Option<Command> {
        match key {
            ' ' | 'n' => Some(Command::Advance),
            'r' => Some(Command::Reset),
            'w' => Some(Command::ToggleWires),
            's' => Some(Command::ToggleSurface),
            'l' => Some(Command::ToggleLights),
            'i' => Some(Command::ToggleIds),
            _ => None,
        }
    }
}

/// What a command did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CommandOutcome {
    /// The current mesh was re-evaluated at parameter `t`.
    Stepped {
        /// Step counter after the command.
        step: usize,
        /// Interpolation parameter in `(0, 1]`.
        t: f64,
    },
    /// The animation is already past its end; nothing changed.
    Finished,
    /// A display toggle changed; carries the new flags.
    Display(DisplayOptions),
    /// Nothing to do beyond drawing.
    Redraw,
}

/// Which parts of the scene the host should draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayOptions {
    /// Draw edges.
    pub wires: bool,
    /// Draw filled faces.
    pub surface: bool,
    /// Light the faces using their normals.
    pub lights: bool,
    /// Label nodes and faces with their ids.
    pub ids: bool,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            wires: true,
            surface: true,
            lights: false,
            ids: false,
        }
    }
}

impl DisplayOptions {
    /// Flip the flag named by a toggle command. Returns false for other commands.
    pub fn toggle(&mut self, command: Command) -> bool {
        let flag = match command {
            Command::ToggleWires => &mut self.wires,
            Command::ToggleSurface => &mut self.surface,
            Command::ToggleLights => &mut self.lights,
            Command::ToggleIds => &mut self.ids,
            _ => return false,
        };
        *flag = !*flag;
        true
    }
}
