fn main() -> anyhow::Result<()> {
    obj_viewer::run(obj_viewer::config::barbel_scene())
}
