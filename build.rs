const COMMANDS: &[&str] = &["share", "share_files", "share_text", "can_share_to"];

fn main() {
  tauri_plugin::Builder::new(COMMANDS)
    .android_path("android")
    .ios_path("ios")
    .build();
}
