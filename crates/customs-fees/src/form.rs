use uz_customs_fees::{
    DeclarationScenario, EscortScenario, FeeCommand, ServiceFee, ServiceScenario,
    StorageScenario, StorageSite,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Declaration,
    Storage,
    Escort,
    Services,
    Tariffs,
}

impl Tab {
    pub fn all() -> [Tab; 5] {
        [
            Tab::Declaration,
            Tab::Storage,
            Tab::Escort,
            Tab::Services,
            Tab::Tariffs,
        ]
    }

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Declaration => "Declaration",
            Tab::Storage => "Storage",
            Tab::Escort => "Escort",
            Tab::Services => "Services",
            Tab::Tariffs => "Tariff table",
        }
    }

    pub fn index(&self) -> usize {
        Tab::all().iter().position(|tab| tab == self).unwrap_or(0)
    }

    pub fn next(&self) -> Tab {
        let tabs = Tab::all();
        tabs[(self.index() + 1) % tabs.len()]
    }

    pub fn previous(&self) -> Tab {
        let tabs = Tab::all();
        tabs[(self.index() + tabs.len() - 1) % tabs.len()]
    }
}

/// One editable row as the inputs panel shows it.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub label: &'static str,
    pub value: String,
    pub numeric: bool,
}

impl Field {
    fn number(label: &'static str, value: String) -> Self {
        Self {
            label,
            value,
            numeric: true,
        }
    }

    fn choice(label: &'static str, value: String) -> Self {
        Self {
            label,
            value,
            numeric: false,
        }
    }

    fn toggle(label: &'static str, on: bool) -> Self {
        Self::choice(label, if on { "[x]" } else { "[ ]" }.to_string())
    }
}

pub trait Form {
    fn fields(&self) -> Vec<Field>;

    /// Steps a number, flips a toggle or cycles a choice. `steps` is negative for left.
    fn adjust(&mut self, index: usize, steps: i32);

    /// Returns false when the field does not take typed numbers.
    fn set_number(&mut self, index: usize, value: f64) -> bool;

    fn command(&self) -> FeeCommand;
}

fn step(value: f64, delta: f64, steps: i32) -> f64 {
    (value + delta * steps as f64).max(0.0)
}

#[derive(Debug, Clone)]
pub struct DeclarationForm {
    customs_value_usd: f64,
    early_declaration: bool,
    after_hours: bool,
    inspection_hours_normal: f64,
    inspection_hours_after_hours: f64,
}

impl Default for DeclarationForm {
    fn default() -> Self {
        Self {
            customs_value_usd: 50_000.0,
            early_declaration: false,
            after_hours: false,
            inspection_hours_normal: 0.0,
            inspection_hours_after_hours: 0.0,
        }
    }
}

impl DeclarationForm {
    pub fn customs_value_usd(&self) -> f64 {
        self.customs_value_usd
    }
}

impl Form for DeclarationForm {
    fn fields(&self) -> Vec<Field> {
        vec![
            Field::number("Customs value (USD)", format!("{}", self.customs_value_usd)),
            Field::toggle("Early declaration (-20%)", self.early_declaration),
            Field::toggle("After-hours clearance", self.after_hours),
            Field::number("Inspection hours", format!("{}", self.inspection_hours_normal)),
            Field::number(
                "Inspection hours, after hours",
                format!("{}", self.inspection_hours_after_hours),
            ),
        ]
    }

    fn adjust(&mut self, index: usize, steps: i32) {
        match index {
            0 => self.customs_value_usd = step(self.customs_value_usd, 1_000.0, steps),
            1 => self.early_declaration = !self.early_declaration,
            2 => self.after_hours = !self.after_hours,
            3 => self.inspection_hours_normal = step(self.inspection_hours_normal, 0.5, steps),
            4 => {
                self.inspection_hours_after_hours =
                    step(self.inspection_hours_after_hours, 0.5, steps)
            }
            _ => {}
        }
    }

    fn set_number(&mut self, index: usize, value: f64) -> bool {
        match index {
            0 => self.customs_value_usd = value,
            3 => self.inspection_hours_normal = value,
            4 => self.inspection_hours_after_hours = value,
            _ => return false,
        }
        true
    }

    fn command(&self) -> FeeCommand {
        FeeCommand::Declaration(DeclarationScenario {
            customs_value_usd: self.customs_value_usd,
            early_declaration: self.early_declaration,
            after_hours: self.after_hours,
            inspection_hours_normal: self.inspection_hours_normal,
            inspection_hours_after_hours: self.inspection_hours_after_hours,
        })
    }
}

#[derive(Debug, Clone)]
pub struct StorageForm {
    site: StorageSite,
    weight_kg: f64,
    total_days: u32,
    perishable: bool,
}

impl Default for StorageForm {
    fn default() -> Self {
        Self {
            site: StorageSite::Warehouse,
            weight_kg: 1_000.0,
            total_days: 15,
            perishable: false,
        }
    }
}

impl Form for StorageForm {
    fn fields(&self) -> Vec<Field> {
        vec![
            Field::choice("Storage site", self.site.name().to_string()),
            Field::number("Weight (kg)", format!("{}", self.weight_kg)),
            Field::number("Days", format!("{}", self.total_days)),
            Field::toggle("Perishable goods", self.perishable),
        ]
    }

    fn adjust(&mut self, index: usize, steps: i32) {
        match index {
            0 => {
                self.site = match self.site {
                    StorageSite::Warehouse => StorageSite::BorderPost,
                    StorageSite::BorderPost => StorageSite::Warehouse,
                }
            }
            1 => self.weight_kg = step(self.weight_kg, 100.0, steps),
            2 => self.total_days = step(self.total_days as f64, 1.0, steps) as u32,
            3 => self.perishable = !self.perishable,
            _ => {}
        }
    }

    fn set_number(&mut self, index: usize, value: f64) -> bool {
        match index {
            1 => self.weight_kg = value,
            2 if value >= 0.0 && value.fract() == 0.0 && value <= u32::MAX as f64 => {
                self.total_days = value as u32
            }
            _ => return false,
        }
        true
    }

    fn command(&self) -> FeeCommand {
        FeeCommand::Storage(StorageScenario {
            site: self.site,
            weight_kg: self.weight_kg,
            total_days: self.total_days,
            perishable: self.perishable,
        })
    }
}

#[derive(Debug, Clone)]
pub struct EscortForm {
    distance_km: f64,
    vehicles: u32,
}

impl Default for EscortForm {
    fn default() -> Self {
        Self {
            distance_km: 150.0,
            vehicles: 1,
        }
    }
}

impl Form for EscortForm {
    fn fields(&self) -> Vec<Field> {
        vec![
            Field::number("Distance (km)", format!("{}", self.distance_km)),
            Field::number("Vehicles", format!("{}", self.vehicles)),
        ]
    }

    fn adjust(&mut self, index: usize, steps: i32) {
        match index {
            0 => self.distance_km = step(self.distance_km, 10.0, steps),
            1 => self.vehicles = step(self.vehicles as f64, 1.0, steps) as u32,
            _ => {}
        }
    }

    fn set_number(&mut self, index: usize, value: f64) -> bool {
        match index {
            0 => self.distance_km = value,
            1 if value >= 0.0 && value.fract() == 0.0 && value <= u32::MAX as f64 => {
                self.vehicles = value as u32
            }
            _ => return false,
        }
        true
    }

    fn command(&self) -> FeeCommand {
        FeeCommand::Escort(EscortScenario {
            distance_km: self.distance_km,
            vehicles: self.vehicles,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ServicesForm {
    service: ServiceFee,
    count: f64,
}

impl Default for ServicesForm {
    fn default() -> Self {
        Self {
            service: ServiceFee::Transit,
            count: 1.0,
        }
    }
}

impl Form for ServicesForm {
    fn fields(&self) -> Vec<Field> {
        vec![
            Field::choice("Service", self.service.name().to_string()),
            Field::number(
                "Count",
                format!("{} {}(s)", self.count, self.service.unit()),
            ),
        ]
    }

    fn adjust(&mut self, index: usize, steps: i32) {
        match index {
            0 => {
                let services = ServiceFee::all();
                let current = services
                    .iter()
                    .position(|s| *s == self.service)
                    .unwrap_or(0) as i32;
                let len = services.len() as i32;
                self.service = services[(current + steps).rem_euclid(len) as usize];
            }
            1 => self.count = step(self.count, 1.0, steps),
            _ => {}
        }
    }

    fn set_number(&mut self, index: usize, value: f64) -> bool {
        if index == 1 {
            self.count = value;
            return true;
        }
        false
    }

    fn command(&self) -> FeeCommand {
        FeeCommand::Service(ServiceScenario {
            service: self.service,
            count: self.count,
        })
    }
}

/// Input state of every calculator tab, kept while the user switches tabs.
#[derive(Debug, Clone, Default)]
pub struct Forms {
    pub declaration: DeclarationForm,
    pub storage: StorageForm,
    pub escort: EscortForm,
    pub services: ServicesForm,
}

impl Forms {
    pub fn get(&self, tab: Tab) -> Option<&dyn Form> {
        match tab {
            Tab::Declaration => Some(&self.declaration),
            Tab::Storage => Some(&self.storage),
            Tab::Escort => Some(&self.escort),
            Tab::Services => Some(&self.services),
            Tab::Tariffs => None,
        }
    }

    pub fn get_mut(&mut self, tab: Tab) -> Option<&mut dyn Form> {
        match tab {
            Tab::Declaration => Some(&mut self.declaration),
            Tab::Storage => Some(&mut self.storage),
            Tab::Escort => Some(&mut self.escort),
            Tab::Services => Some(&mut self.services),
            Tab::Tariffs => None,
        }
    }
}
