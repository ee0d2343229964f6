mod dom;
mod icon_view;
mod media;
mod page;
mod player_view;
mod storage;

fn main() {
    console_error_panic_hook::set_once();
    if let Err(err) = page::mount() {
        gloo::console::error!("page: mount failed", err);
    }
}
