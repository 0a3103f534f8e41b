mod load;
mod types;

pub use load::{
    apply_env_overrides, get_tripcrew_data_dir, get_tripcrew_env_file_path, load_default,
    load_from_path,
};
pub use types::*;
