mod board;
pub use board::Board;
pub use board::PlayedMove;
pub use board::CHECKERS_PER_COLOR;

mod player;
pub use player::Color;

mod position;
pub use position::Location;

mod outcome;
pub use outcome::Win;
pub use outcome::WinKind;

mod game;
pub use game::Match;
pub use game::Phase;
pub use game::MAX_CUBE;

mod halfmove;
pub use halfmove::HalfMove;

mod full_move;
pub use full_move::FullMove;

mod dice;
pub use dice::Dice;

mod events;
pub use events::MatchEvent;
pub use events::MatchObserver;
pub use events::MatchSnapshot;
pub use events::TracingObserver;

pub mod wire;
