mod auth;
mod config;
mod currency;
mod invoice_doc;
mod models;
mod stats;
mod store;
mod tax;
mod ui;

use std::io;

use anyhow::Result;
use chrono::Local;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use tui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use crate::auth::Session;
use crate::invoice_doc::InvoiceDocGenerator;
use crate::models::{Expense, Firm, Invoice};
use crate::ui::{
    client_wizard::{
        handle_input as handle_client_wizard_input, render_client_wizard, ClientWizardAction,
        ClientWizardState,
    },
    clients::{handle_input as handle_clients_input, render_clients, ClientAction, ClientsState},
    dashboard::{
        handle_input as handle_dashboard_input, render_dashboard, DashboardAction, DashboardState,
    },
    expense_wizard::{
        handle_input as handle_expense_wizard_input, render_expense_wizard, ExpenseWizardAction,
        ExpenseWizardState,
    },
    expenses::{
        handle_input as handle_expenses_input, render_expenses, ExpenseAction, ExpensesState,
    },
    firm_wizard::{
        handle_input as handle_firm_wizard_input, render_firm_wizard, FirmWizardAction,
        FirmWizardState,
    },
    firms::{handle_input as handle_firms_input, render_firms, FirmAction, FirmsState},
    invoice_wizard::{
        handle_input as handle_invoice_wizard_input, render_invoice_wizard, InvoiceWizardAction,
        InvoiceWizardState,
    },
    invoices::{
        handle_input as handle_invoices_input, render_invoices, InvoiceAction, InvoicesState,
    },
    login::{handle_input as handle_login_input, render_login, LoginAction, LoginState},
};

// Represents the current screen in the app
enum AppScreen {
    Login,
    Dashboard,
    Firms,
    FirmWizard,
    Clients,
    ClientWizard,
    Invoices,
    InvoiceWizard,
    Expenses,
    ExpenseWizard,
}

// Main application state
struct AppState {
    store: store::Store,
    output_dir: String,
    session: Option<Session>,
    screen: AppScreen,
    login_state: Option<LoginState>,
    dashboard_state: Option<DashboardState>,
    firms_state: Option<FirmsState>,
    firm_wizard_state: Option<FirmWizardState>,
    clients_state: Option<ClientsState>,
    client_wizard_state: Option<ClientWizardState>,
    invoices_state: Option<InvoicesState>,
    invoice_wizard_state: Option<InvoiceWizardState>,
    expenses_state: Option<ExpensesState>,
    expense_wizard_state: Option<ExpenseWizardState>,
}

impl AppState {
    fn new(store: store::Store, output_dir: String) -> Self {
        Self {
            store,
            output_dir,
            session: None,
            screen: AppScreen::Login,
            login_state: None,
            dashboard_state: None,
            firms_state: None,
            firm_wizard_state: None,
            clients_state: None,
            client_wizard_state: None,
            invoices_state: None,
            invoice_wizard_state: None,
            expenses_state: None,
            expense_wizard_state: None,
        }
    }

    /// Firms the signed-in user may see, already sorted by the store.
    async fn accessible_firms(&self) -> Result<Vec<Firm>> {
        let firms = self.store.load_firms().await?;
        Ok(self.filter_by_access(firms, |firm: &Firm| firm.id.clone()))
    }

    async fn accessible_invoices(&self) -> Result<Vec<Invoice>> {
        let invoices = self.store.load_invoices().await?;
        Ok(self.filter_by_access(invoices, |inv: &Invoice| inv.firm_id.clone()))
    }

    async fn accessible_expenses(&self) -> Result<Vec<Expense>> {
        let expenses = self.store.load_expenses().await?;
        Ok(self.filter_by_access(expenses, |exp: &Expense| exp.firm_id.clone()))
    }

    fn filter_by_access<T, F>(&self, records: Vec<T>, firm_id: F) -> Vec<T>
    where
        F: Fn(&T) -> String,
    {
        match &self.session {
            Some(session) => records
                .into_iter()
                .filter(|record| session.has_access_to_firm(&firm_id(record)))
                .collect(),
            None => Vec::new(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = config::init()?;

    // Open the record store (seeds demo data on first run)
    let store = store::init(&config).await?;

    // Setup terminal
    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app state
    let mut app_state = AppState::new(store, config.output_dir().to_string());

    // Start at the sign-in screen
    load_login_screen(&mut app_state);

    // Run the main app loop
    let result = run_app(&mut terminal, &mut app_state).await;

    // Restore terminal
    terminal::disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    // Show any error message
    if let Err(err) = result {
        println!("Error: {}", err);
    }

    Ok(())
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app_state: &mut AppState) -> Result<()> {
    loop {
        // Render current screen
        terminal.draw(|f| match app_state.screen {
            AppScreen::Login => {
                if let Some(state) = &mut app_state.login_state {
                    render_login(f, state);
                }
            }
            AppScreen::Dashboard => {
                if let Some(state) = &mut app_state.dashboard_state {
                    render_dashboard(f, state);
                }
            }
            AppScreen::Firms => {
                if let Some(state) = &mut app_state.firms_state {
                    render_firms(f, state);
                }
            }
            AppScreen::FirmWizard => {
                if let Some(state) = &mut app_state.firm_wizard_state {
                    render_firm_wizard(f, state);
                }
            }
            AppScreen::Clients => {
                if let Some(state) = &mut app_state.clients_state {
                    render_clients(f, state);
                }
            }
            AppScreen::ClientWizard => {
                if let Some(state) = &mut app_state.client_wizard_state {
                    render_client_wizard(f, state);
                }
            }
            AppScreen::Invoices => {
                if let Some(state) = &mut app_state.invoices_state {
                    render_invoices(f, state);
                }
            }
            AppScreen::InvoiceWizard => {
                if let Some(state) = &mut app_state.invoice_wizard_state {
                    render_invoice_wizard(f, state);
                }
            }
            AppScreen::Expenses => {
                if let Some(state) = &mut app_state.expenses_state {
                    render_expenses(f, state);
                }
            }
            AppScreen::ExpenseWizard => {
                if let Some(state) = &mut app_state.expense_wizard_state {
                    render_expense_wizard(f, state);
                }
            }
        })?;

        // Handle input for current screen
        let should_quit = match app_state.screen {
            AppScreen::Login => handle_login_screen(app_state).await?,
            AppScreen::Dashboard => handle_dashboard_screen(app_state).await?,
            AppScreen::Firms => handle_firms_screen(app_state).await?,
            AppScreen::FirmWizard => handle_firm_wizard_screen(app_state).await?,
            AppScreen::Clients => handle_clients_screen(app_state).await?,
            AppScreen::ClientWizard => handle_client_wizard_screen(app_state).await?,
            AppScreen::Invoices => handle_invoices_screen(app_state).await?,
            AppScreen::InvoiceWizard => handle_invoice_wizard_screen(app_state).await?,
            AppScreen::Expenses => handle_expenses_screen(app_state).await?,
            AppScreen::ExpenseWizard => handle_expense_wizard_screen(app_state).await?,
        };

        if should_quit {
            break;
        }
    }

    Ok(())
}

fn load_login_screen(app_state: &mut AppState) {
    app_state.session = None;
    app_state.login_state = Some(LoginState::new());
    app_state.screen = AppScreen::Login;
}

async fn load_dashboard_screen(app_state: &mut AppState) -> Result<()> {
    let firms = app_state.accessible_firms().await?;
    let clients = app_state.store.load_clients().await?;
    let invoices = app_state.accessible_invoices().await?;
    let expenses = app_state.accessible_expenses().await?;

    let today = Local::now().date_naive();
    let stats = stats::dashboard_stats(&firms, &clients, &invoices, &expenses, today);
    let recent_invoices = stats::recent_invoices(&invoices, 5);
    let recent_expenses = stats::recent_expenses(&expenses, 5);

    let user_name = app_state
        .session
        .as_ref()
        .map(|s| s.user().name.clone())
        .unwrap_or_default();

    app_state.dashboard_state = Some(DashboardState::new(
        user_name,
        stats,
        recent_invoices,
        recent_expenses,
    ));
    app_state.screen = AppScreen::Dashboard;

    Ok(())
}

async fn load_firms_screen(app_state: &mut AppState) -> Result<()> {
    let firms = app_state.accessible_firms().await?;

    app_state.firms_state = Some(FirmsState::new(firms));
    app_state.screen = AppScreen::Firms;

    Ok(())
}

async fn load_clients_screen(app_state: &mut AppState) -> Result<()> {
    let clients = app_state.store.load_clients().await?;

    app_state.clients_state = Some(ClientsState::new(clients));
    app_state.screen = AppScreen::Clients;

    Ok(())
}

async fn load_invoices_screen(app_state: &mut AppState) -> Result<()> {
    let invoices = app_state.accessible_invoices().await?;
    let firms = app_state.accessible_firms().await?;
    let clients = app_state.store.load_clients().await?;

    app_state.invoices_state = Some(InvoicesState::new(invoices, firms, clients));
    app_state.screen = AppScreen::Invoices;

    Ok(())
}

async fn load_expenses_screen(app_state: &mut AppState) -> Result<()> {
    let expenses = app_state.accessible_expenses().await?;
    let firms = app_state.accessible_firms().await?;

    app_state.expenses_state = Some(ExpensesState::new(expenses, firms));
    app_state.screen = AppScreen::Expenses;

    Ok(())
}

async fn handle_login_screen(app_state: &mut AppState) -> Result<bool> {
    if let Some(state) = &mut app_state.login_state {
        match handle_login_input(state)? {
            Some(LoginAction::Exit) => {
                return Ok(true);
            }
            Some(LoginAction::Submit) => {
                let users = app_state.store.load_users().await?;
                let (email, password) = state.credentials();
                match Session::login(&users, email, password) {
                    Ok(session) => {
                        app_state.session = Some(session);
                        load_dashboard_screen(app_state).await?;
                    }
                    Err(err) => {
                        state.set_error(err.to_string());
                    }
                }
            }
            None => {}
        }
    }

    Ok(false)
}

async fn handle_dashboard_screen(app_state: &mut AppState) -> Result<bool> {
    if let Some(state) = &mut app_state.dashboard_state {
        match handle_dashboard_input(state)? {
            Some(DashboardAction::Exit) => {
                return Ok(true);
            }
            Some(DashboardAction::Logout) => {
                load_login_screen(app_state);
            }
            Some(DashboardAction::Firms) => {
                load_firms_screen(app_state).await?;
            }
            Some(DashboardAction::Clients) => {
                load_clients_screen(app_state).await?;
            }
            Some(DashboardAction::Invoices) => {
                load_invoices_screen(app_state).await?;
            }
            Some(DashboardAction::Expenses) => {
                load_expenses_screen(app_state).await?;
            }
            None => {}
        }
    }

    Ok(false)
}

async fn handle_firms_screen(app_state: &mut AppState) -> Result<bool> {
    if let Some(state) = &mut app_state.firms_state {
        match handle_firms_input(state)? {
            Some(FirmAction::Back) => {
                load_dashboard_screen(app_state).await?;
            }
            Some(FirmAction::NewFirm) => {
                app_state.firm_wizard_state = Some(FirmWizardState::new());
                app_state.screen = AppScreen::FirmWizard;
            }
            Some(FirmAction::EditFirm(firm_id)) => {
                let firm = app_state.store.get_firm(&firm_id).await?;

                app_state.firm_wizard_state = Some(FirmWizardState::from_existing(firm));
                app_state.screen = AppScreen::FirmWizard;
            }
            Some(FirmAction::DeleteFirm(firm_id)) => {
                // A failed delete leaves the list untouched and reports
                // the error instead of unwinding the whole app.
                match app_state.store.delete_firm(&firm_id).await {
                    Ok(()) => {
                        load_firms_screen(app_state).await?;
                    }
                    Err(err) => {
                        state.set_notice(format!("Failed to delete firm: {}", err));
                    }
                }
            }
            None => {}
        }
    }

    Ok(false)
}

async fn handle_firm_wizard_screen(app_state: &mut AppState) -> Result<bool> {
    if let Some(state) = &mut app_state.firm_wizard_state {
        match handle_firm_wizard_input(state)? {
            Some(FirmWizardAction::Cancel) => {
                load_firms_screen(app_state).await?;
            }
            Some(FirmWizardAction::Save(firm)) => {
                let result = if firm.id.is_empty() {
                    app_state.store.create_firm(firm).await.map(|_| ())
                } else {
                    app_state.store.update_firm(&firm).await
                };

                match result {
                    Ok(()) => {
                        load_firms_screen(app_state).await?;
                    }
                    Err(err) => {
                        state.show_error = Some(format!("Failed to save firm: {}", err));
                    }
                }
            }
            None => {}
        }
    }

    Ok(false)
}

async fn handle_clients_screen(app_state: &mut AppState) -> Result<bool> {
    if let Some(state) = &mut app_state.clients_state {
        match handle_clients_input(state)? {
            Some(ClientAction::Back) => {
                load_dashboard_screen(app_state).await?;
            }
            Some(ClientAction::NewClient) => {
                app_state.client_wizard_state = Some(ClientWizardState::new());
                app_state.screen = AppScreen::ClientWizard;
            }
            Some(ClientAction::EditClient(client_id)) => {
                let client = app_state.store.get_client(&client_id).await?;

                app_state.client_wizard_state = Some(ClientWizardState::from_existing(client));
                app_state.screen = AppScreen::ClientWizard;
            }
            Some(ClientAction::DeleteClient(client_id)) => {
                match app_state.store.delete_client(&client_id).await {
                    Ok(()) => {
                        load_clients_screen(app_state).await?;
                    }
                    Err(err) => {
                        state.set_notice(format!("Failed to delete client: {}", err));
                    }
                }
            }
            None => {}
        }
    }

    Ok(false)
}

async fn handle_client_wizard_screen(app_state: &mut AppState) -> Result<bool> {
    if let Some(state) = &mut app_state.client_wizard_state {
        match handle_client_wizard_input(state)? {
            Some(ClientWizardAction::Cancel) => {
                load_clients_screen(app_state).await?;
            }
            Some(ClientWizardAction::Save(client)) => {
                let result = if client.id.is_empty() {
                    app_state.store.create_client(client).await.map(|_| ())
                } else {
                    app_state.store.update_client(&client).await
                };

                match result {
                    Ok(()) => {
                        load_clients_screen(app_state).await?;
                    }
                    Err(err) => {
                        state.show_error = Some(format!("Failed to save client: {}", err));
                    }
                }
            }
            None => {}
        }
    }

    Ok(false)
}

async fn handle_invoices_screen(app_state: &mut AppState) -> Result<bool> {
    if let Some(state) = &mut app_state.invoices_state {
        match handle_invoices_input(state)? {
            Some(InvoiceAction::Back) => {
                load_dashboard_screen(app_state).await?;
            }
            Some(InvoiceAction::NewInvoice) => {
                let firms = app_state.accessible_firms().await?;
                let clients = app_state.store.load_clients().await?;

                app_state.invoice_wizard_state =
                    Some(InvoiceWizardState::new(&firms, &clients, None));
                app_state.screen = AppScreen::InvoiceWizard;
            }
            Some(InvoiceAction::EditInvoice(invoice_id)) => {
                let invoice = app_state.store.get_invoice(&invoice_id).await?;
                let firms = app_state.accessible_firms().await?;
                let clients = app_state.store.load_clients().await?;

                app_state.invoice_wizard_state =
                    Some(InvoiceWizardState::new(&firms, &clients, Some(invoice)));
                app_state.screen = AppScreen::InvoiceWizard;
            }
            Some(InvoiceAction::DeleteInvoice(invoice_id)) => {
                match app_state.store.delete_invoice(&invoice_id).await {
                    Ok(()) => {
                        load_invoices_screen(app_state).await?;
                    }
                    Err(err) => {
                        state.set_notice(format!("Failed to delete invoice: {}", err));
                    }
                }
            }
            Some(InvoiceAction::GenerateDoc(invoice_id)) => {
                let notice = generate_invoice_doc(app_state, &invoice_id).await;
                if let Some(state) = &mut app_state.invoices_state {
                    state.set_notice(notice);
                }
            }
            None => {}
        }
    }

    Ok(false)
}

/// Write the markdown/PDF pair for an invoice and describe the outcome.
async fn generate_invoice_doc(app_state: &AppState, invoice_id: &str) -> String {
    let result: Result<String> = async {
        let invoice = app_state.store.get_invoice(invoice_id).await?;
        let firm = app_state.store.get_firm(&invoice.firm_id).await?;
        let client = app_state.store.get_client(&invoice.client_id).await?;

        let generator = InvoiceDocGenerator::new(&app_state.output_dir)?;
        let (md_path, _pdf_path) = generator.generate(&invoice, &firm, &client)?;
        Ok(md_path)
    }
    .await;

    match result {
        Ok(path) => format!("Invoice document written to {}", path),
        Err(err) => format!("Failed to generate invoice document: {}", err),
    }
}

async fn handle_invoice_wizard_screen(app_state: &mut AppState) -> Result<bool> {
    if let Some(state) = &mut app_state.invoice_wizard_state {
        match handle_invoice_wizard_input(state)? {
            Some(InvoiceWizardAction::Cancel) => {
                load_invoices_screen(app_state).await?;
            }
            Some(InvoiceWizardAction::Save(invoice)) => {
                let result = if invoice.id.is_empty() {
                    app_state.store.create_invoice(invoice).await.map(|_| ())
                } else {
                    app_state.store.update_invoice(&invoice).await
                };

                match result {
                    Ok(()) => {
                        load_invoices_screen(app_state).await?;
                    }
                    Err(err) => {
                        state.show_error = Some(format!("Failed to save invoice: {}", err));
                    }
                }
            }
            None => {}
        }
    }

    Ok(false)
}

async fn handle_expenses_screen(app_state: &mut AppState) -> Result<bool> {
    if let Some(state) = &mut app_state.expenses_state {
        match handle_expenses_input(state)? {
            Some(ExpenseAction::Back) => {
                load_dashboard_screen(app_state).await?;
            }
            Some(ExpenseAction::NewExpense) => {
                let firms = app_state.accessible_firms().await?;

                app_state.expense_wizard_state = Some(ExpenseWizardState::new(&firms));
                app_state.screen = AppScreen::ExpenseWizard;
            }
            Some(ExpenseAction::EditExpense(expense_id)) => {
                let expense = app_state.store.get_expense(&expense_id).await?;
                let firms = app_state.accessible_firms().await?;

                app_state.expense_wizard_state =
                    Some(ExpenseWizardState::from_existing(&firms, expense));
                app_state.screen = AppScreen::ExpenseWizard;
            }
            Some(ExpenseAction::DeleteExpense(expense_id)) => {
                match app_state.store.delete_expense(&expense_id).await {
                    Ok(()) => {
                        load_expenses_screen(app_state).await?;
                    }
                    Err(err) => {
                        state.set_notice(format!("Failed to delete expense: {}", err));
                    }
                }
            }
            None => {}
        }
    }

    Ok(false)
}

async fn handle_expense_wizard_screen(app_state: &mut AppState) -> Result<bool> {
    if let Some(state) = &mut app_state.expense_wizard_state {
        match handle_expense_wizard_input(state)? {
            Some(ExpenseWizardAction::Cancel) => {
                load_expenses_screen(app_state).await?;
            }
            Some(ExpenseWizardAction::Save(expense)) => {
                let result = if expense.id.is_empty() {
                    app_state.store.create_expense(expense).await.map(|_| ())
                } else {
                    app_state.store.update_expense(&expense).await
                };

                match result {
                    Ok(()) => {
                        load_expenses_screen(app_state).await?;
                    }
                    Err(err) => {
                        state.show_error = Some(format!("Failed to save expense: {}", err));
                    }
                }
            }
            None => {}
        }
    }

    Ok(false)
}
