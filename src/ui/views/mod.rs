mod user_list;

pub use user_list::UserListView;
