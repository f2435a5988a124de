mod convert_api;
mod helpers;
