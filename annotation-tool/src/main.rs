fn main() -> eframe::Result {
    annotation_tool::run_native()
}
