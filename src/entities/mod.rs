pub mod prelude;

pub mod categories;
pub mod comments;
pub mod genre_title;
pub mod genres;
pub mod reviews;
pub mod titles;
pub mod users;
