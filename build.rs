fn main() {
    // The webview shell is optional; library builds and tests skip Tauri codegen.
    #[cfg(feature = "desktop")]
    tauri_build::build();
}
