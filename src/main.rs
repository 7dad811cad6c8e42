fn main() {
    gridiron_tracking::cli::run();
}
