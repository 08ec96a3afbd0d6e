pub mod post;
pub mod profile;
pub mod user;

pub use post::{Comment, Like, Post, PostView};
pub use profile::{Education, Experience, OwnerView, Profile, ProfileView, SocialLinks};
pub use user::{User, UserView};
