use kite_export::app::run;

fn main() -> color_eyre::Result<()> {
    run()
}
