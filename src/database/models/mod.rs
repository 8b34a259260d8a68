pub mod category;
pub mod ticket;
pub mod user;

pub use category::Category;
pub use ticket::{Estado, MensajeDetalle, Prioridad, Ticket, TicketChat, TicketDetalle, TicketScope, Urgencia};
pub use user::{Rol, User};
