//! Blog domain: articles and their comments.
//!
//! | Entity  | create              | read                              | edit                     | delete                       |
//! |---------|---------------------|-----------------------------------|--------------------------|------------------------------|
//! | Article | staff author        | public, or authenticated if gated | author or staff editor   | author, while uncommented    |
//! | Comment | authenticated users | everyone                          | author or staff moderator | staff moderator             |

pub mod article;
pub mod comment;

pub use article::Article;
pub use comment::Comment;
