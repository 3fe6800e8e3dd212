use std::fmt;

use tiorelay_map::Direction;

/// One half of the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// Faces the microcontroller over the serial line.
    Serial,
    /// Faces the GUI over the Unix domain socket.
    Socket,
}

impl Side {
    /// Table used to rewrite messages arriving at this side for writing.
    ///
    /// The serial side writes GUI-originated messages, the socket side
    /// writes microcontroller-originated ones.
    pub fn direction(self) -> Direction {
        match self {
            Side::Serial => Direction::Gui,
            Side::Socket => Direction::Micro,
        }
    }

    pub fn opposite(self) -> Side {
        match self {
            Side::Serial => Side::Socket,
            Side::Socket => Side::Serial,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Side::Serial => "serial",
            Side::Socket => "socket",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
