use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use robotics_storefront::{
    api::{CustomerQuery, OrderQuery, ProductQuery},
    config::{self, AppConfig},
    models::{Customer, CustomerStatus, CustomerTier, Order, OrderStatus, Product, ProductStatus},
    services::{
        delivery_progress, AdminOrderBoard, FileStorage, OrderSort, OrderTrackingService,
        ProductFilters, SearchHistory, StockLevel, TrackingView,
    },
    ApiClient, Services, Store,
};
use serde::Serialize;
use tracing::debug;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let context = CliContext::initialize()?;

    match cli.command {
        Commands::Orders(command) => handle_orders_command(&context, command, cli.json).await?,
        Commands::Customers(command) => {
            handle_customers_command(&context, command, cli.json).await?
        }
        Commands::Products(command) => {
            handle_products_command(&context, command, cli.json).await?
        }
        Commands::Search(command) => handle_search_command(&context, command, cli.json)?,
    }

    Ok(())
}

#[derive(Parser)]
#[command(
    name = "storefront-cli",
    about = "Operator CLI for the robotics storefront",
    version
)]
struct Cli {
    #[arg(
        long,
        global = true,
        action = ArgAction::SetTrue,
        help = "Render command output as pretty JSON"
    )]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(subcommand)]
    Orders(OrdersCommands),
    #[command(subcommand)]
    Customers(CustomersCommands),
    #[command(subcommand)]
    Products(ProductsCommands),
    #[command(subcommand)]
    Search(SearchCommands),
}

#[derive(Subcommand)]
enum OrdersCommands {
    List(OrdersListArgs),
    Show(OrderIdArgs),
    UpdateStatus(OrdersUpdateStatusArgs),
    Track(OrderIdArgs),
}

#[derive(Args)]
struct OrdersListArgs {
    #[arg(long, help = "Only orders in this status (e.g. pending, shipped)")]
    status: Option<OrderStatus>,
    #[arg(long, help = "Only orders containing a product from this category")]
    category: Option<u64>,
    #[arg(long, help = "Match order id, customer or product name")]
    search: Option<String>,
    #[arg(long, help = "newest, oldest, total_high or total_low")]
    sort: Option<OrderSort>,
    #[arg(long)]
    page: Option<u32>,
    #[arg(long)]
    per_page: Option<u32>,
    #[arg(
        long,
        action = ArgAction::SetTrue,
        help = "Print per-status counts instead of the order rows"
    )]
    counts: bool,
}

#[derive(Args)]
struct OrderIdArgs {
    #[arg(help = "Order id")]
    id: u64,
}

#[derive(Args)]
struct OrdersUpdateStatusArgs {
    #[arg(required = true, help = "One or more order ids")]
    ids: Vec<u64>,
    #[arg(long, help = "New status")]
    status: OrderStatus,
}

#[derive(Subcommand)]
enum CustomersCommands {
    List(CustomersListArgs),
    Tier(CustomerTierArgs),
    Status(CustomerStatusArgs),
}

#[derive(Args)]
struct CustomersListArgs {
    #[arg(long)]
    tier: Option<CustomerTier>,
    #[arg(long)]
    status: Option<CustomerStatus>,
    #[arg(long)]
    search: Option<String>,
    #[arg(long)]
    page: Option<u32>,
}

#[derive(Args)]
struct CustomerTierArgs {
    id: u64,
    #[arg(help = "bronze, silver, gold or platinum")]
    tier: CustomerTier,
}

#[derive(Args)]
struct CustomerStatusArgs {
    id: u64,
    #[arg(help = "active, inactive or blocked")]
    status: CustomerStatus,
}

#[derive(Subcommand)]
enum ProductsCommands {
    List(ProductsListArgs),
}

#[derive(Args)]
struct ProductsListArgs {
    #[arg(long)]
    status: Option<ProductStatus>,
    #[arg(long)]
    category: Option<u64>,
    #[arg(long, help = "in_stock, low_stock or out_of_stock")]
    stock: Option<StockLevel>,
    #[arg(long)]
    search: Option<String>,
    #[arg(long)]
    page: Option<u32>,
}

#[derive(Subcommand)]
enum SearchCommands {
    Add(SearchTermArgs),
    Suggest(SearchPrefixArgs),
    Clear,
}

#[derive(Args)]
struct SearchTermArgs {
    term: String,
}

#[derive(Args)]
struct SearchPrefixArgs {
    #[arg(default_value = "")]
    prefix: String,
}

struct CliContext {
    config: AppConfig,
    services: Services,
}

impl CliContext {
    fn initialize() -> Result<Self> {
        let config = config::load_config().context("failed to load application config")?;
        config::init_tracing(config.log_level(), config.log_json);

        let client = ApiClient::new(&config).context("failed to build API client")?;
        debug!(
            target: "storefront_cli",
            base_url = %client.base_url(),
            "API client ready"
        );

        Ok(Self {
            services: Services::from_client(client),
            config,
        })
    }

    fn store(&self) -> Store {
        Store::new(self.services.clone(), &self.config)
    }

    fn search_history(&self) -> SearchHistory<FileStorage> {
        SearchHistory::with_limit(
            FileStorage::new(self.config.storage_path.clone()),
            self.config.recent_searches_limit,
        )
    }
}

async fn handle_orders_command(
    context: &CliContext,
    command: OrdersCommands,
    json: bool,
) -> Result<()> {
    match command {
        OrdersCommands::List(args) => {
            let mut board = AdminOrderBoard::new(context.services.orders.clone());
            board
                .load(OrderQuery {
                    page: args.page,
                    per_page: args.per_page.or(Some(context.config.default_page_size)),
                    status: args.status,
                    search: None,
                })
                .await
                .context("failed to list orders")?;

            board.filters.category = args.category.into();
            board.filters.search = args.search.unwrap_or_default();
            board.filters.sort = args.sort;

            if args.counts {
                let counts: Vec<StatusCount> = board
                    .status_counts()
                    .into_iter()
                    .map(|(status, count)| StatusCount { status, count })
                    .collect();
                if json {
                    print_json(&counts)?;
                } else {
                    for entry in &counts {
                        println!("{:<12} {}", entry.status.label(), entry.count);
                    }
                }
                return Ok(());
            }

            let visible = board.visible_orders();
            if json {
                let rows: Vec<&Order> = visible.iter().map(|order| order.as_ref()).collect();
                print_json(&rows)?;
            } else {
                if let Some(meta) = board.pagination() {
                    println!(
                        "Orders page {}/{} ({} total, {} shown)",
                        meta.current_page,
                        meta.last_page,
                        meta.total,
                        visible.len()
                    );
                }
                for order in &visible {
                    render_order(order);
                }
            }
            Ok(())
        }
        OrdersCommands::Show(args) => {
            let store = context.store();
            let order = store
                .orders
                .fetch_order(args.id)
                .await
                .with_context(|| format!("failed to fetch order {}", args.id))?;
            if json {
                print_json(order.as_ref())?;
            } else {
                render_order(&order);
                for item in &order.items {
                    println!(
                        "  • {} x {} @ {} (total {})",
                        item.quantity,
                        item.name,
                        item.price,
                        item.line_total()
                    );
                }
                println!(
                    "  subtotal {} • shipping {} • tax {} • discount {} • total {} {}",
                    order.totals.subtotal,
                    order.totals.shipping,
                    order.totals.tax,
                    order.totals.discount,
                    order.totals.total,
                    context.config.currency
                );
            }
            Ok(())
        }
        OrdersCommands::UpdateStatus(args) => {
            let mut board = AdminOrderBoard::new(context.services.orders.clone());
            let report = board.batch_update_status(&args.ids, args.status).await;
            if json {
                print_json(&report)?;
            } else {
                for id in &report.updated {
                    println!("Order {} → {}", id, args.status.label());
                }
                for (id, reason) in &report.failed {
                    eprintln!("Order {} not updated: {}", id, reason);
                }
            }
            if report.is_complete() {
                Ok(())
            } else {
                Err(anyhow!(
                    "{} of {} orders could not be updated",
                    report.failed.len(),
                    args.ids.len()
                ))
            }
        }
        OrdersCommands::Track(args) => {
            let service = OrderTrackingService::new(context.services.orders.clone());
            let view = service
                .track(args.id)
                .await
                .with_context(|| format!("failed to fetch tracking for order {}", args.id))?;
            if json {
                print_json(&view)?;
            } else {
                render_tracking(&view);
            }
            Ok(())
        }
    }
}

async fn handle_customers_command(
    context: &CliContext,
    command: CustomersCommands,
    json: bool,
) -> Result<()> {
    let store = context.store();
    match command {
        CustomersCommands::List(args) => {
            store
                .customers
                .fetch_customers(CustomerQuery {
                    page: args.page,
                    per_page: Some(context.config.default_page_size),
                    tier: args.tier,
                    status: args.status,
                    search: args.search,
                })
                .await
                .context("failed to list customers")?;
            let customers = store.customers.snapshot().customers;
            if json {
                let rows: Vec<&Customer> = customers.iter().map(|c| c.as_ref()).collect();
                print_json(&rows)?;
            } else {
                for customer in &customers {
                    render_customer(customer);
                }
            }
            Ok(())
        }
        CustomersCommands::Tier(args) => {
            let customer = store
                .customers
                .update_tier(args.id, args.tier)
                .await
                .with_context(|| format!("failed to update tier for customer {}", args.id))?;
            if json {
                print_json(customer.as_ref())?;
            } else {
                render_customer(&customer);
            }
            Ok(())
        }
        CustomersCommands::Status(args) => {
            let customer = store
                .customers
                .update_status(args.id, args.status)
                .await
                .with_context(|| format!("failed to update status for customer {}", args.id))?;
            if json {
                print_json(customer.as_ref())?;
            } else {
                render_customer(&customer);
            }
            Ok(())
        }
    }
}

async fn handle_products_command(
    context: &CliContext,
    command: ProductsCommands,
    json: bool,
) -> Result<()> {
    let store = context.store();
    match command {
        ProductsCommands::List(args) => {
            store
                .catalog
                .fetch_products(ProductQuery {
                    page: args.page,
                    per_page: Some(context.config.default_page_size),
                    ..Default::default()
                })
                .await
                .context("failed to list products")?;

            let filters = ProductFilters {
                status: args.status.into(),
                category: args.category.into(),
                stock: args.stock.into(),
                search: args.search.unwrap_or_default(),
            };
            let products = filters.apply(&store.catalog.snapshot().products);

            if json {
                let rows: Vec<&Product> = products.iter().map(|p| p.as_ref()).collect();
                print_json(&rows)?;
            } else {
                for product in &products {
                    render_product(product, &context.config.currency);
                }
            }
            Ok(())
        }
    }
}

fn handle_search_command(context: &CliContext, command: SearchCommands, json: bool) -> Result<()> {
    let history = context.search_history();
    let terms = match command {
        SearchCommands::Add(args) => history
            .add(&args.term)
            .context("failed to record search term")?,
        SearchCommands::Suggest(args) => history
            .suggestions(&args.prefix)
            .context("failed to read recent searches")?,
        SearchCommands::Clear => {
            history.clear().context("failed to clear recent searches")?;
            Vec::new()
        }
    };

    if json {
        print_json(&terms)?;
    } else if terms.is_empty() {
        println!("No recent searches");
    } else {
        for term in &terms {
            println!("- {}", term);
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct StatusCount {
    status: OrderStatus,
    count: usize,
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn render_order(order: &Order) {
    let progress = delivery_progress(order.status)
        .map(|p| format!("{}%", p))
        .unwrap_or_else(|| "-".to_string());
    println!(
        "- Order {} • {} • status {} ({}) • {} item(s) • total {}",
        order.reference(),
        order.customer_name.as_deref().unwrap_or("unknown customer"),
        order.status.label(),
        progress,
        order.item_count(),
        order.totals.total
    );
}

fn render_tracking(view: &TrackingView) {
    println!(
        "Order {} • {} • progress {}",
        view.order_id,
        view.status.label(),
        view.progress
            .map(|p| format!("{}%", p))
            .unwrap_or_else(|| "n/a".to_string())
    );
    if let (Some(carrier), Some(number)) = (&view.carrier, &view.tracking_number) {
        println!("  {} tracking {}", carrier, number);
    }
    if let Some(eta) = view.estimated_delivery {
        println!("  estimated delivery {}", eta);
    }
    for row in &view.rows {
        let marker = if row.is_current { "●" } else { "○" };
        let location = row
            .location
            .as_deref()
            .map(|l| format!(" • {}", l))
            .unwrap_or_default();
        println!(
            "  {} {} • {} • {}{}",
            marker, row.display_time, row.title, row.description, location
        );
    }
}

fn render_customer(customer: &Customer) {
    println!(
        "- Customer {} • {} <{}> • tier {} • status {} • {} order(s)",
        customer.id,
        customer.name,
        customer.email,
        customer.tier,
        customer.status,
        customer.orders_count
    );
}

fn render_product(product: &Arc<Product>, currency: &str) {
    println!(
        "- Product {} • {} • SKU {} • price {} {} • stock {} ({})",
        product.id,
        product.name,
        product.sku,
        product.price,
        currency,
        product.stock,
        StockLevel::of(product)
    );
}
