use colored::*;

pub fn print_logo() {
    let logo = r#"
   ┌─┐┬ ┬┬─┐┬  ┬┌─┐┬  ┌─┐┌┐
   │  │ │├┬┘└┐┌┘├┤ │  ├─┤├┴┐
   └─┘└─┘┴└─ └┘ └─┘┴─┘┴ ┴└─┘
"#;
    println!("{}", logo.cyan().bold());
    println!(
        "{}",
        "      Bonding-curve fitting & pool price toolkit"
            .white()
            .italic()
    );
    println!("{}", "      v0.1.0".dimmed());
    println!();
}
