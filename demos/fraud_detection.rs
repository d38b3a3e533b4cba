use bayesnet_rs::{BayesNet, CptSpec, Evidence, NodeSpec, Result, enumeration_ask};
use tracing::Level;

/// Card Fraud Detection with a Bayesian Network
///
/// The card holder may be travelling or own a computer; either changes how
/// likely foreign, internet and computer-related purchases are, and so does
/// fraud. Given observed purchases we ask how likely the transaction is fraud.
fn main() -> Result<()> {
    let verbose = std::env::args().any(|a| a == "--verbose");
    tracing_subscriber::fmt()
        .with_max_level(if verbose { Level::DEBUG } else { Level::INFO })
        .init();

    let bn = BayesNet::from_specs([
        NodeSpec::new("Travel", Vec::<String>::new(), 0.05),
        NodeSpec::new("Fraud", ["Travel"], CptSpec::single([(true, 0.01), (false, 0.004)])),
        NodeSpec::new(
            "ForeignPurchase",
            ["Fraud", "Travel"],
            CptSpec::table([
                ([true, true], 0.90),
                ([true, false], 0.10),
                ([false, true], 0.90),
                ([false, false], 0.01),
            ]),
        ),
        NodeSpec::new("OwnsComputer", Vec::<String>::new(), 0.60),
        NodeSpec::new(
            "InternetPurchase",
            ["Fraud", "OwnsComputer"],
            CptSpec::table([
                ([true, true], 0.02),
                ([true, false], 0.011),
                ([false, true], 0.01),
                ([false, false], 0.001),
            ]),
        ),
        NodeSpec::new(
            "ComputerPurchase",
            ["OwnsComputer"],
            CptSpec::single([(true, 0.10), (false, 0.001)]),
        ),
    ])?;

    println!("🕸️  Card Fraud Network");
    println!("=====================\n");
    for node in bn.nodes() {
        println!("   {node}");
    }
    println!();

    let purchases = Evidence::from([
        ("ForeignPurchase", true),
        ("InternetPurchase", false),
        ("ComputerPurchase", true),
    ]);
    let queries = [
        ("P(Fraud)", Evidence::new()),
        ("P(Fraud | purchases)", purchases.clone()),
        ("P(Fraud | purchases, Travel)", purchases.with("Travel", true)),
    ];

    println!("🔍 Posterior Queries:");
    for (label, evidence) in &queries {
        let posterior = enumeration_ask("Fraud", evidence, &bn)?;
        println!("   {label}: {}", posterior.show_approx(3));
        println!("      evidence: {evidence}");
    }

    Ok(())
}
