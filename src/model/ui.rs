//! UI state - presentation state separate from domain data

/// Tab selection in the main UI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    /// Server-paginated users table
    Users,
    /// Client-side table over a snapshot of users
    AllUsers,
    Employees,
    News,
    Counter,
    Register,
}

impl Tab {
    pub fn all() -> Vec<Tab> {
        vec![
            Tab::Users,
            Tab::AllUsers,
            Tab::Employees,
            Tab::News,
            Tab::Counter,
            Tab::Register,
        ]
    }

    pub fn name(&self) -> &str {
        match self {
            Tab::Users => "Users",
            Tab::AllUsers => "All Users",
            Tab::Employees => "Employees",
            Tab::News => "News",
            Tab::Counter => "Counter",
            Tab::Register => "Register",
        }
    }

    pub fn index(&self) -> usize {
        Tab::all().iter().position(|t| t == self).unwrap_or(0)
    }

    pub fn next(&self) -> Tab {
        let tabs = Tab::all();
        tabs[(self.index() + 1) % tabs.len()]
    }

    pub fn previous(&self) -> Tab {
        let tabs = Tab::all();
        tabs[(self.index() + tabs.len() - 1) % tabs.len()]
    }

    /// Whether the tab shows a data table
    pub fn has_table(&self) -> bool {
        matches!(self, Tab::Users | Tab::AllUsers | Tab::Employees)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_cycle_wraps() {
        assert_eq!(Tab::Users.next(), Tab::AllUsers);
        assert_eq!(Tab::Register.next(), Tab::Users);
        assert_eq!(Tab::Users.previous(), Tab::Register);
    }
}
